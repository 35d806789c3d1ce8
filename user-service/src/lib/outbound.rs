pub mod google;
pub mod repositories;
