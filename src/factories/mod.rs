pub mod relay_factory;
