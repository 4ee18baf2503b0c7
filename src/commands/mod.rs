pub mod amc;
pub mod department;
pub mod jobs;
pub mod leave;
pub mod rma;
pub mod utils;
