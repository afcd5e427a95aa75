use super::handlers::{guard, health};
use utoipa::openapi::{
    ComponentsBuilder, Contact, InfoBuilder, License, OpenApiBuilder, Tag,
    security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Router that also drives the `OpenAPI` document. Anything registered here
/// is both served and documented; `OPTIONS /health` is added in `app` and is
/// left out of the document.
pub(crate) fn api_router() -> OpenApiRouter {
    let mut router = OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(health::health))
        .routes(routes!(guard::admission))
        .routes(routes!(guard::navigation))
        .routes(routes!(guard::login))
        .routes(routes!(guard::logout_confirm))
        .routes(routes!(guard::logout_cancel));

    router.get_openapi_mut().tags = Some(vec![
        tag("health", "Service and auth provider reachability"),
        tag(
            "guard",
            "Route admission, back-navigation interception and logout",
        ),
    ]);

    router
}

fn tag(name: &str, description: &str) -> Tag {
    let mut tag = Tag::new(name);
    tag.description = Some(description.to_string());
    tag
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(optional_str(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    info.contact = cargo_contact(env!("CARGO_PKG_AUTHORS"));
    info.license = optional_str(env!("CARGO_PKG_LICENSE")).map(|identifier| {
        let mut license = License::new(identifier);
        license.identifier = Some(identifier.to_string());
        license
    });

    // Access tokens issued by the auth provider.
    let components = ComponentsBuilder::new()
        .security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        )
        .build();

    OpenApiBuilder::new()
        .info(info)
        .components(Some(components))
        .build()
}

// Cargo joins authors with `;`, each one possibly "Name <email>".
fn cargo_contact(authors: &str) -> Option<Contact> {
    let primary = authors.split(';').next().map(str::trim)?;
    let (name, email) = match primary.split_once('<') {
        Some((name, email)) => (name.trim(), email.trim_end_matches('>').trim()),
        None => (primary, ""),
    };
    if name.is_empty() && email.is_empty() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = (!name.is_empty()).then(|| name.to_string());
    contact.email = (!email.is_empty()).then(|| email.to_string());
    Some(contact)
}

fn optional_str(value: &'static str) -> Option<&'static str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_info_from_cargo() {
        let doc = openapi();
        assert_eq!(doc.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(doc.info.version, env!("CARGO_PKG_VERSION"));

        let contact = doc.info.contact.unwrap_or_default();
        assert_eq!(contact.name.as_deref(), Some("Team Praxis"));
        assert_eq!(contact.email.as_deref(), Some("team@praxis.dev"));

        let license = doc.info.license.map(|license| license.name);
        assert_eq!(license.as_deref(), Some("BSD-3-Clause"));
    }

    #[test]
    fn guard_paths_are_documented() {
        let doc = openapi();
        for path in [
            "/health",
            "/v1/guard/admission",
            "/v1/guard/navigation",
            "/v1/guard/login",
            "/v1/guard/logout/confirm",
            "/v1/guard/logout/cancel",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }

        let tags = doc.tags.unwrap_or_default();
        assert!(tags.iter().any(|tag| tag.name == "guard"));

        let schemes = doc
            .components
            .map(|components| components.security_schemes)
            .unwrap_or_default();
        assert!(schemes.contains_key("bearer"));
    }

    #[test]
    fn contact_parsing_handles_partial_authors() {
        let contact = cargo_contact("Jane Doe");
        assert_eq!(
            contact.and_then(|contact| contact.name),
            Some("Jane Doe".to_string())
        );

        let contact = cargo_contact("<ops@praxis.dev>; Someone Else");
        assert_eq!(contact.as_ref().and_then(|c| c.name.clone()), None);
        assert_eq!(
            contact.and_then(|c| c.email),
            Some("ops@praxis.dev".to_string())
        );

        assert!(cargo_contact("  ").is_none());
    }
}
