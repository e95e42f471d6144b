//! Static copy for the landing page.
//!
//! Everything here is display data: the carousel cycles over
//! [`SiteContent::testimonials`] and the consultation form offers
//! [`SiteContent::service_titles`] as its service picker.

use serde::{Deserialize, Serialize};

/// Number of stars in a rating row.
pub const MAX_RATING: u8 = 5;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Testimonial {
    pub id: u32,
    pub name: String,
    pub role: String,
    pub company: String,
    pub content: String,
    pub rating: u8,
    pub image: String,
}

impl Testimonial {
    /// Star row for display: `rating` filled stars followed by empty ones.
    pub fn stars(&self) -> [bool; MAX_RATING as usize] {
        let mut row = [false; MAX_RATING as usize];
        for (i, star) in row.iter_mut().enumerate() {
            *star = i < usize::from(self.rating);
        }
        row
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Service {
    pub title: String,
    pub description: String,
    /// Icon name, resolved to an inline glyph by the templates.
    pub icon: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Highlight {
    pub title: String,
    pub description: String,
    pub icon: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Hero {
    pub badge: String,
    pub headline_accent: String,
    pub headline: String,
    pub lead: String,
    pub primary_cta: String,
    pub secondary_cta: String,
    pub trust_points: Vec<Highlight>,
    pub featured: Vec<Highlight>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FooterColumn {
    pub heading: String,
    pub links: Vec<NavLink>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contact {
    pub address_lines: Vec<String>,
    pub phone_display: String,
    pub phone_href: String,
    pub email: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Footer {
    pub tagline: String,
    pub socials: Vec<NavLink>,
    pub columns: Vec<FooterColumn>,
    pub contact: Contact,
    pub legal: Vec<NavLink>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteContent {
    pub brand: String,
    pub nav_links: Vec<NavLink>,
    pub hero: Hero,
    pub services: Vec<Service>,
    pub testimonials: Vec<Testimonial>,
    pub benefits: Vec<Highlight>,
    pub footer: Footer,
}

impl SiteContent {
    /// Titles offered by the consultation form's service picker.
    pub fn service_titles(&self) -> Vec<String> {
        self.services.iter().map(|s| s.title.clone()).collect()
    }

    /// The LawXygen copy deck.
    pub fn lawxygen() -> Self {
        Self {
            brand: "LawXygen".to_string(),
            nav_links: vec![
                link("Home", "#"),
                link("Services", "#services"),
                link("About", "#about"),
                link("Testimonials", "#testimonials"),
                link("Contact", "#contact"),
            ],
            hero: Hero {
                badge: "Professional Legal Services".to_string(),
                headline_accent: "Simplified".to_string(),
                headline: "Legal Solutions for Your Business".to_string(),
                lead: "Navigate the complexities of business and legal processes with our \
                       expert guidance. We're here to help you succeed with confidence."
                    .to_string(),
                primary_cta: "Book a Consultation".to_string(),
                secondary_cta: "Explore Services".to_string(),
                trust_points: vec![
                    highlight("Trusted by 10,000+ businesses", "", "shield"),
                    highlight("Expert legal advisors", "", "scale"),
                    highlight("100% secure & confidential", "", "file-text"),
                ],
                featured: vec![
                    highlight("Business Registration", "Quick & hassle-free process", "scale"),
                    highlight(
                        "Trademark Registration",
                        "Protect your brand identity",
                        "file-text",
                    ),
                    highlight(
                        "Legal Consultation",
                        "Expert advice for your business",
                        "shield",
                    ),
                ],
            },
            services: vec![
                service(
                    "Business Registration",
                    "Register your business entity quickly and efficiently with our streamlined process.",
                    "briefcase",
                ),
                service(
                    "Trademark Registration",
                    "Protect your brand identity with our comprehensive trademark registration services.",
                    "shield",
                ),
                service(
                    "Legal Documentation",
                    "Get professionally drafted legal documents tailored to your specific requirements.",
                    "file-text",
                ),
                service(
                    "Tax Compliance",
                    "Ensure your business remains compliant with all tax regulations and requirements.",
                    "bar-chart",
                ),
                service(
                    "Intellectual Property",
                    "Comprehensive IP protection strategies for your business innovations and assets.",
                    "file-check",
                ),
                service(
                    "Legal Consultation",
                    "Get expert legal advice for your business decisions and strategic planning.",
                    "scale",
                ),
                service(
                    "Corporate Compliance",
                    "Stay compliant with all regulatory requirements with our corporate compliance services.",
                    "scroll-text",
                ),
                service(
                    "HR & Employment",
                    "Navigate complex employment laws and create compliant HR policies for your business.",
                    "users",
                ),
            ],
            testimonials: vec![
                Testimonial {
                    id: 1,
                    name: "Sarah Johnson".to_string(),
                    role: "CEO".to_string(),
                    company: "Innovate Tech".to_string(),
                    content: "Working with this team has been transformative for our business. \
                              Their expert legal guidance helped us navigate complex regulations \
                              during our expansion phase."
                        .to_string(),
                    rating: 5,
                    image: "https://images.unsplash.com/photo-1494790108377-be9c29b29330?w=400&h=400&auto=format&fit=crop&q=80".to_string(),
                },
                Testimonial {
                    id: 2,
                    name: "Michael Chen".to_string(),
                    role: "Founder".to_string(),
                    company: "GrowthLabs".to_string(),
                    content: "We saved countless hours and resources by utilizing their business \
                              registration services. The process was smooth, and the team was \
                              always available to address our concerns."
                        .to_string(),
                    rating: 5,
                    image: "https://images.unsplash.com/photo-1560250097-0b93528c311a?w=400&h=400&auto=format&fit=crop&q=80".to_string(),
                },
                Testimonial {
                    id: 3,
                    name: "Priya Patel".to_string(),
                    role: "Legal Director".to_string(),
                    company: "Horizon Partners".to_string(),
                    content: "Their attention to detail and deep understanding of corporate law \
                              has been invaluable for our organization. I highly recommend their \
                              services to any growing business."
                        .to_string(),
                    rating: 5,
                    image: "https://images.unsplash.com/photo-1573496359142-b8d87734a5a2?w=400&h=400&auto=format&fit=crop&q=80".to_string(),
                },
            ],
            benefits: vec![
                highlight(
                    "Expert Legal Advisors",
                    "Our team of experienced legal professionals will provide you with expert \
                     guidance tailored to your business needs.",
                    "check-circle",
                ),
                highlight(
                    "Transparent Process",
                    "We believe in complete transparency throughout the process, with clear \
                     timelines and pricing structures.",
                    "check-circle",
                ),
                highlight(
                    "Dedicated Support",
                    "You'll have a dedicated team supporting you throughout your journey, \
                     ensuring a smooth and stress-free experience.",
                    "check-circle",
                ),
            ],
            footer: Footer {
                tagline: "Simplifying legal and business processes with expert guidance and \
                          innovative solutions."
                    .to_string(),
                socials: vec![
                    link("Facebook", "#"),
                    link("Twitter", "#"),
                    link("Instagram", "#"),
                    link("LinkedIn", "#"),
                ],
                columns: vec![
                    FooterColumn {
                        heading: "Services".to_string(),
                        links: vec![
                            link("Business Registration", "#services"),
                            link("Trademark Registration", "#services"),
                            link("Legal Documentation", "#services"),
                            link("Tax Compliance", "#services"),
                            link("Legal Consultation", "#services"),
                        ],
                    },
                    FooterColumn {
                        heading: "Company".to_string(),
                        links: vec![
                            link("About Us", "#"),
                            link("Our Team", "#"),
                            link("Careers", "#"),
                            link("Blog", "#"),
                            link("Press", "#"),
                        ],
                    },
                ],
                contact: Contact {
                    address_lines: vec![
                        "123 Business Avenue, Suite 100".to_string(),
                        "New York, NY 10001".to_string(),
                    ],
                    phone_display: "+1 (234) 567-890".to_string(),
                    phone_href: "tel:+1234567890".to_string(),
                    email: "info@lawxygen.com".to_string(),
                },
                legal: vec![
                    link("Privacy Policy", "#"),
                    link("Terms of Service", "#"),
                    link("Cookies", "#"),
                ],
            },
        }
    }
}

impl Default for SiteContent {
    fn default() -> Self {
        Self::lawxygen()
    }
}

fn link(label: &str, href: &str) -> NavLink {
    NavLink {
        label: label.to_string(),
        href: href.to_string(),
    }
}

fn highlight(title: &str, description: &str, icon: &str) -> Highlight {
    Highlight {
        title: title.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
    }
}

fn service(title: &str, description: &str, icon: &str) -> Service {
    Service {
        title: title.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stars_fill_rating_then_empty() {
        let mut testimonial = SiteContent::lawxygen().testimonials[0].clone();
        for rating in 1..=MAX_RATING {
            testimonial.rating = rating;
            let stars = testimonial.stars();
            let filled = stars.iter().filter(|s| **s).count();
            assert_eq!(filled, usize::from(rating));
            assert!(stars[..filled].iter().all(|s| *s));
            assert!(stars[filled..].iter().all(|s| !*s));
        }
    }

    #[test]
    fn service_picker_matches_service_grid() {
        let content = SiteContent::lawxygen();
        let titles = content.service_titles();
        assert_eq!(titles.len(), 8);
        assert_eq!(titles[3], "Tax Compliance");
    }
}
