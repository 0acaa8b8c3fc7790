pub mod metalprice;

pub use metalprice::MetalPriceProvider;
