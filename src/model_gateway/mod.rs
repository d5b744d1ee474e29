pub mod gateway;
pub mod impl_fake;
pub mod impl_tract;
pub mod interface;
