//! Repository layer for data access

pub mod campaigns;
pub mod recipients;
pub mod templates;

// Re-export concrete repository implementations with simple names
pub use campaigns::DbCampaignRepository as CampaignRepository;
pub use recipients::DbRecipientRepository as RecipientRepository;
pub use templates::DbTemplateRepository as TemplateRepository;

// Re-export repository traits
pub use campaigns::CampaignRepository as CampaignRepositoryTrait;
pub use recipients::RecipientRepository as RecipientRepositoryTrait;
pub use templates::TemplateRepository as TemplateRepositoryTrait;
