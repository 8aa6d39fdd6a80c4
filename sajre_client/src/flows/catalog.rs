use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::CourseRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogCourse {
    pub title: &'static str,
    pub summary: &'static str,
    pub details: &'static str,
    pub coupon: &'static str,
    pub discount_percent: u8,
}

impl CatalogCourse {
    pub fn discount_label(&self) -> String {
        format!("{}% OFF", self.discount_percent)
    }
}

pub const CATALOG: [CatalogCourse; 5] = [
    CatalogCourse {
        title: "Digital Marketing",
        summary: "Learn SEO, social media marketing, Google Ads, and strategies to grow businesses online.",
        details: "This course covers advanced SEO techniques, PPC strategies, and social media growth hacks. Perfect for entrepreneurs and marketers.",
        coupon: "DIGI2025",
        discount_percent: 20,
    },
    CatalogCourse {
        title: "Fashion Designing",
        summary: "Unleash your creativity with sketching, textile design, and modern fashion trends.",
        details: "Dive into the world of fashion design, garment making, and branding. Includes hands-on projects and portfolio development.",
        coupon: "STYLE25",
        discount_percent: 25,
    },
    CatalogCourse {
        title: "Web Designing",
        summary: "Master UI/UX design, responsive layouts, and front-end development for stunning websites.",
        details: "From HTML, CSS, and JavaScript to advanced responsive design and accessibility. Build stunning real-world projects.",
        coupon: "WEB10",
        discount_percent: 10,
    },
    CatalogCourse {
        title: "Cyber Security",
        summary: "Understand network security, penetration testing, and defense strategies against threats.",
        details: "Hands-on learning in threat detection, ethical hacking basics, and network defense. Includes lab simulations.",
        coupon: "SECURE15",
        discount_percent: 15,
    },
    CatalogCourse {
        title: "Ethical Hacking",
        summary: "Gain hands-on skills in ethical hacking, vulnerability analysis, and digital forensics.",
        details: "Learn to identify vulnerabilities, penetration testing methods, and safeguard systems ethically.",
        coupon: "HACKER30",
        discount_percent: 30,
    },
];

/// Case-insensitive title lookup in the static catalogue.
pub fn find(title: &str) -> Option<&'static CatalogCourse> {
    CATALOG.iter().find(|c| c.title.eq_ignore_ascii_case(title.trim()))
}

/// Courses published by the backend.
pub async fn public_courses(api: &ApiClient) -> Result<Vec<CourseRecord>, ApiError> {
    Ok(api.get_public_courses().await?.into_data())
}
