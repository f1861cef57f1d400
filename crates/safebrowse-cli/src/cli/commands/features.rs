//! `safebrowse features <url>` – show the extractor's output.

use anyhow::Result;
use safebrowse_core::features::UrlFeatures;

pub fn run_features(url: &str, json: bool) -> Result<()> {
    let features = UrlFeatures::from_url(url)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&features)?);
        return Ok(());
    }
    for (index, (name, value)) in features.to_vector().named().enumerate() {
        println!("{:>2} {:<15} {}", index, name, value);
    }
    Ok(())
}
