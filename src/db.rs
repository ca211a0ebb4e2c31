pub mod cbsa_repository;
pub mod error;

pub use cbsa_repository::CbsaRepository;
pub use error::DbError;
