//! Page banners keyed by page name, and the singular gallery-page banner.

use super::resource::update_request;
use crate::api::Api;
use crate::cache::tags::Tag;
use crate::endpoint::{list_tags, MutationEndpoint, QueryEndpoint};
use crate::error::Result;
use crate::models::{ApiResponse, BannerInput, GalleryPageBanner, PageBanner};
use crate::request::ApiRequest;

use super::PAGE_BANNERS;

pub const GALLERY_BANNER_KIND: &str = "GalleryPageBanner";

/// `GET page-banners/page/{page}`: the banner shown on one public page.
///
/// Provides the collection tag as well, so creating a banner for a page that
/// had none refreshes this query.
pub fn by_page() -> QueryEndpoint<String> {
    let kind = PAGE_BANNERS.kind();
    QueryEndpoint::new(format!("{}.by_page", kind), move |page: &String| {
        ApiRequest::get(format!("{}/page/{}", PAGE_BANNERS.path(), page))
    })
    .provides(move |_, response| list_tags(kind, response))
    .transform_response(ApiResponse::into_single)
}

/// `GET gallery-page-banner`. The backend answers with a list; consumers
/// get the single banner, or `null` when none is configured.
pub fn gallery_banner() -> QueryEndpoint<()> {
    QueryEndpoint::new(format!("{}.get", GALLERY_BANNER_KIND), |_: &()| {
        ApiRequest::get("gallery-page-banner")
    })
    .provides(|_, response| list_tags(GALLERY_BANNER_KIND, response))
    .transform_response(ApiResponse::into_single)
}

/// Update the gallery banner with id `id`.
pub fn update_gallery_banner() -> MutationEndpoint<(i64, BannerInput)> {
    MutationEndpoint::new(
        format!("{}.update", GALLERY_BANNER_KIND),
        |(id, input): &(i64, BannerInput)| {
            // The gallery banner has no page key
            let input = BannerInput {
                page: None,
                ..input.clone()
            };
            Ok(update_request(format!("gallery-page-banner/{}", id), &input))
        },
    )
    .invalidates(|(id, _): &(i64, BannerInput), _| {
        vec![Tag::id(GALLERY_BANNER_KIND, *id), Tag::list(GALLERY_BANNER_KIND)]
    })
}

pub async fn fetch_by_page(api: &Api, page: &str) -> Result<Option<PageBanner>> {
    api.query_as(&by_page(), &page.to_string()).await
}

pub async fn fetch_gallery_banner(api: &Api) -> Result<Option<GalleryPageBanner>> {
    api.query_as(&gallery_banner(), &()).await
}

pub async fn save_gallery_banner(
    api: &Api,
    id: i64,
    input: BannerInput,
) -> Result<GalleryPageBanner> {
    api.mutate_as(&update_gallery_banner(), &(id, input)).await
}
