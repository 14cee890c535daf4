//! Data models for the medisite-link client library.
//!
//! Defines the response envelope, pagination metadata, the session user and
//! one record type per CMS resource, together with the input structs used
//! by create/update mutations.

pub mod blog;
pub mod career;
pub mod contact_message;
pub mod director;
pub mod doctor;
pub mod envelope;
pub mod gallery_item;
pub mod installment_rule;
pub mod list_params;
pub mod login_request;
pub mod login_response;
pub mod news_article;
pub mod page_banner;
pub mod pagination;
pub mod status;
pub mod user;


pub use blog::{Blog, BlogInput};
pub use career::Career;
pub use contact_message::{ContactMessage, ContactMessageInput};
pub use director::{Director, DirectorInput};
pub use doctor::Doctor;
pub use envelope::{ApiResponse, Envelope};
pub use gallery_item::{GalleryItem, GalleryItemInput};
pub use installment_rule::{InstallmentRule, InstallmentRuleInput};
pub use list_params::ListParams;
pub use login_request::LoginRequest;
pub use login_response::LoginResponse;
pub use news_article::NewsArticle;
pub use page_banner::{BannerInput, GalleryPageBanner, PageBanner};
pub use pagination::{paginate, Paginated, Pagination};
pub use status::Status;
pub use user::{Role, User, UserUpdate};
