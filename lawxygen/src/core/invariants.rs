//! Content invariants checked before the site is served or rendered.

use std::collections::HashSet;

use crate::content::{MAX_RATING, SiteContent};

/// Check the copy deck:
/// - At least one testimonial (the carousel cycles over them)
/// - Unique testimonial ids
/// - Ratings within `1..=5`
/// - Unique, non-empty service titles (they double as form options)
/// - Navigation anchors start with `#`
pub fn validate_content(content: &SiteContent) -> Vec<String> {
    let mut errors = Vec::new();

    if content.testimonials.is_empty() {
        errors.push("testimonials: at least one testimonial is required".to_string());
    }

    let mut seen_ids = HashSet::new();
    for (index, testimonial) in content.testimonials.iter().enumerate() {
        let path = format!("testimonials[{}]", index);
        if !seen_ids.insert(testimonial.id) {
            errors.push(format!("duplicate testimonial id {} at {}", testimonial.id, path));
        }
        if !(1..=MAX_RATING).contains(&testimonial.rating) {
            errors.push(format!(
                "{}: rating {} outside 1..={}",
                path, testimonial.rating, MAX_RATING
            ));
        }
        if testimonial.name.trim().is_empty() {
            errors.push(format!("{}: name must not be empty", path));
        }
    }

    let mut seen_titles = HashSet::new();
    for (index, service) in content.services.iter().enumerate() {
        let path = format!("services[{}]", index);
        if service.title.trim().is_empty() {
            errors.push(format!("{}: title must not be empty", path));
        } else if !seen_titles.insert(service.title.as_str()) {
            errors.push(format!("duplicate service title '{}' at {}", service.title, path));
        }
    }

    for (index, nav) in content.nav_links.iter().enumerate() {
        if !nav.href.starts_with('#') {
            errors.push(format!(
                "nav_links[{}]: href '{}' must be an in-page anchor",
                index, nav.href
            ));
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{content_with_ratings, testimonial};

    #[test]
    fn shipped_content_is_valid() {
        assert!(validate_content(&SiteContent::lawxygen()).is_empty());
    }

    #[test]
    fn reports_content_errors() {
        let mut content = content_with_ratings(&[0, 6]);
        content.testimonials.push(testimonial(1, 3));
        content.services[1].title = content.services[0].title.clone();
        content.nav_links[0].href = "/home".to_string();

        let errors = validate_content(&content);
        assert!(errors.iter().any(|err| err.contains("rating 0")));
        assert!(errors.iter().any(|err| err.contains("rating 6")));
        assert!(errors.iter().any(|err| err.contains("duplicate testimonial id 1")));
        assert!(errors.iter().any(|err| err.contains("duplicate service title")));
        assert!(errors.iter().any(|err| err.contains("in-page anchor")));
    }

    #[test]
    fn empty_testimonials_are_rejected() {
        let content = content_with_ratings(&[]);
        let errors = validate_content(&content);
        assert_eq!(
            errors,
            vec!["testimonials: at least one testimonial is required".to_string()]
        );
    }
}
