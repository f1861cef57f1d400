pub mod model_fixture;
