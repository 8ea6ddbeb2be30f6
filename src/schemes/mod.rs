pub(crate) mod amc;
pub(crate) mod schemes_errors;
pub(crate) mod schemes_model;
pub(crate) mod schemes_repository;
pub(crate) mod schemes_service;
pub(crate) mod schemes_traits;

pub use amc::{extract_amc, sub_category, AssetClass};
pub use schemes_errors::SchemeError;
pub use schemes_model::{NavBand, NavPoint, Scheme, SchemeUpsert};
pub use schemes_repository::SchemeRepository;
pub use schemes_service::SchemeService;
pub use schemes_traits::{SchemeRepositoryTrait, SchemeServiceTrait};
