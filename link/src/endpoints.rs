//! Resource endpoint modules.
//!
//! One descriptor factory per CMS resource. Standard collections are
//! [`Resource`] constants; the auth endpoints and the two banner kinds have
//! their own modules because their shapes differ.

pub mod auth;
pub mod banners;
mod resource;

pub use resource::{ReadOnly, Resource};

use crate::models::{
    BannerInput, Blog, BlogInput, Career, ContactMessage, ContactMessageInput, Director,
    DirectorInput, Doctor, GalleryItem, GalleryItemInput, InstallmentRule, InstallmentRuleInput,
    NewsArticle, PageBanner,
};

pub const BLOGS: Resource<Blog, BlogInput> = Resource::new("Blog", "blogs");
pub const DIRECTORS: Resource<Director, DirectorInput> = Resource::new("Director", "directors");
pub const GALLERIES: Resource<GalleryItem, GalleryItemInput> =
    Resource::new("Gallery", "galleries");
pub const INSTALLMENT_RULES: Resource<InstallmentRule, InstallmentRuleInput> =
    Resource::new("InstallmentRule", "installment-rules");
/// Creating a message is public; listing, reading and deleting need an
/// admin token.
pub const CONTACT_MESSAGES: Resource<ContactMessage, ContactMessageInput> =
    Resource::new("ContactMessage", "contact-messages");
pub const PAGE_BANNERS: Resource<PageBanner, BannerInput> =
    Resource::new("PageBanner", "page-banners");

pub const DOCTORS: Resource<Doctor> = Resource::new("Doctor", "doctors");
pub const NEWS: Resource<NewsArticle> = Resource::new("News", "news");
pub const CAREERS: Resource<Career> = Resource::new("Career", "careers");
