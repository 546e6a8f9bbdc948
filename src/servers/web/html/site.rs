//! The public one-page site, in either locale.

use std::fmt::Write;

use super::{document, Esc, Render, Shell};
use crate::config::SiteConfig;
use crate::database::{Destination, Package};
use crate::i18n::{localized, Locale, Translations};

/// Packages listed before the "load more" link.
pub const PACKAGES_PREVIEW: usize = 6;

const HERO_SLIDES: [&str; 3] = [
    "/images/hero/hero-1.png",
    "/images/hero/hero-2.png",
    "/images/hero/hero-3.png",
];

const GALLERY_IMAGES: usize = 8;

const REVIEWS: [&str; 3] = ["james", "sarah", "michael"];
const REVIEW_RATING: usize = 5;

const NAV_ITEMS: [(&str, &str); 6] = [
    ("destination", "destinations"),
    ("about", "about"),
    ("package", "packages"),
    ("gallery", "gallery"),
    ("testimonials", "testimonials"),
    ("contact", "contact"),
];

/// Outcome banner after a form post redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    ContactSent,
    ContactError,
    NewsletterSent,
    NewsletterError,
}

impl Notice {
    /// Read `?sent=<form>` / `?error=<form>`.
    pub fn from_query(sent: Option<&str>, error: Option<&str>) -> Option<Self> {
        match (sent, error) {
            (_, Some("contact")) => Some(Notice::ContactError),
            (_, Some("newsletter")) => Some(Notice::NewsletterError),
            (Some("contact"), _) => Some(Notice::ContactSent),
            (Some("newsletter"), _) => Some(Notice::NewsletterSent),
            _ => None,
        }
    }
}

pub struct HomePage<'a> {
    pub locale: Locale,
    pub translations: &'a Translations,
    pub config: &'a SiteConfig,
    /// `None` when the store could not be read.
    pub destinations: Option<&'a [Destination]>,
    pub packages: Option<&'a [Package]>,
    pub all_packages: bool,
    pub notice: Option<Notice>,
}

impl<'a> HomePage<'a> {
    fn t(&self, key: &'a str) -> Esc<'a> {
        Esc(self.translations.t(self.locale, key))
    }

    fn whatsapp(&self) -> Esc<'a> {
        Esc(&self.config.whatsapp_url)
    }

    pub fn render(&self) -> Render {
        let mut body = String::with_capacity(32 * 1024);
        self.nav(&mut body)?;
        body.push_str("<main>\n");
        self.hero(&mut body)?;
        self.destinations(&mut body)?;
        self.about(&mut body)?;
        self.packages(&mut body)?;
        self.gallery(&mut body)?;
        self.testimonials(&mut body)?;
        self.team(&mut body)?;
        self.contact(&mut body)?;
        body.push_str("</main>\n");
        self.footer(&mut body)?;
        self.whatsapp_button(&mut body)?;

        let shell = Shell {
            lang: self.locale.code(),
            dir: self.locale.dir(),
            title: self.translations.t(self.locale, "meta.title"),
            description: self.translations.t(self.locale, "meta.description"),
            body_class: "site",
        };
        document(&shell, &body)
    }

    fn nav(&self, out: &mut String) -> std::fmt::Result {
        let other = self.locale.other();
        write!(
            out,
            r#"<header class="nav"><div class="container nav-inner">
<a class="brand" href="/{}">{}</a>
<nav aria-label="main"><ul class="nav-links">"#,
            self.locale,
            self.t("nav.brand"),
        )?;
        for (key, anchor) in NAV_ITEMS {
            let label = format!("nav.{key}");
            write!(
                out,
                r##"<li><a href="#{anchor}">{}</a></li>"##,
                Esc(self.translations.t(self.locale, &label)),
            )?;
        }
        write!(
            out,
            r#"</ul></nav>
<a class="lang-switch" href="/{}" hreflang="{}" aria-label="{}">{}</a>
</div></header>
"#,
            other,
            other,
            self.t("nav.language"),
            Esc(other.native_name()),
        )
    }

    fn hero(&self, out: &mut String) -> std::fmt::Result {
        out.push_str(r#"<section id="hero" class="hero"><div class="hero-track">"#);
        for (i, image) in HERO_SLIDES.iter().enumerate() {
            write!(
                out,
                r#"<figure class="hero-slide" id="hero-slide-{}"><img src="{}" alt="{}"{}></figure>"#,
                i + 1,
                image,
                self.t("hero.subtitle"),
                if i == 0 { "" } else { r#" loading="lazy""# },
            )?;
        }
        write!(
            out,
            r#"</div>
<div class="hero-content container">
<p class="hero-subtitle">{}</p>
<h1>{}</h1>
<p class="hero-description">{}</p>
<a class="btn btn-primary" href="{}" target="_blank" rel="noopener noreferrer">{}</a>
<div class="hero-social">
<a href="{}" target="_blank" rel="noopener noreferrer" aria-label="Facebook">Facebook</a>
<a href="{}" target="_blank" rel="noopener noreferrer" aria-label="{}">WhatsApp</a>
</div>
</div>
<div class="hero-dots">"#,
            self.t("hero.subtitle"),
            self.t("hero.title"),
            self.t("hero.description"),
            self.whatsapp(),
            self.t("hero.cta"),
            Esc(&self.config.facebook_url),
            self.whatsapp(),
            self.t("whatsapp.label"),
        )?;
        for i in 1..=HERO_SLIDES.len() {
            write!(
                out,
                r##"<a href="#hero-slide-{i}" aria-label="{} {i}"></a>"##,
                self.t("hero.slide"),
            )?;
        }
        out.push_str("</div></section>\n");
        Ok(())
    }

    fn section_heading(&self, out: &mut String, prefix: &str) -> std::fmt::Result {
        let bg = format!("{prefix}.titleBg");
        let title = format!("{prefix}.title");
        write!(
            out,
            r#"<div class="section-heading"><span class="title-bg" aria-hidden="true">{}</span><h2>{}</h2></div>"#,
            Esc(self.translations.t(self.locale, &bg)),
            Esc(self.translations.t(self.locale, &title)),
        )
    }

    fn destinations(&self, out: &mut String) -> std::fmt::Result {
        out.push_str(r#"<section id="destinations" class="section"><div class="container">"#);
        self.section_heading(out, "destinations")?;
        writeln!(out, r#"<p class="section-subtitle">{}</p>"#, self.t("destinations.subtitle"))?;

        match self.destinations {
            None => {
                writeln!(out, r#"<p class="load-error">{}</p>"#, self.t("destinations.loadError"))?;
            }
            Some([]) => {
                writeln!(out, r#"<p class="empty">{}</p>"#, self.t("destinations.empty"))?;
            }
            Some(rows) => {
                out.push_str(r#"<div class="card-grid">"#);
                for d in rows {
                    self.destination_card(out, d)?;
                }
                out.push_str("</div>\n");
            }
        }
        out.push_str("</div></section>\n");
        Ok(())
    }

    fn destination_card(&self, out: &mut String, d: &Destination) -> std::fmt::Result {
        let name = localized(self.locale, &d.name_en, &d.name_ar);
        write!(
            out,
            r#"<article class="card destination-card">
<img src="{}" alt="{}" loading="lazy">
<div class="card-body">
<h3>{}</h3>
<p class="card-meta"><span>{} {} / {} {}</span><span>{} {}</span></p>
<p class="card-price">{} <strong>{}</strong></p>
<a class="btn btn-primary" href="{}" target="_blank" rel="noopener noreferrer">{}</a>
</div>
</article>
"#,
            Esc(&d.image),
            Esc(name),
            Esc(name),
            Esc(&d.days),
            self.t("destinations.days"),
            Esc(&d.nights),
            self.t("destinations.nights"),
            Esc(&d.people),
            self.t("destinations.people"),
            self.t("destinations.startFrom"),
            Esc(&d.price),
            self.whatsapp(),
            self.t("destinations.bookNow"),
        )
    }

    fn about(&self, out: &mut String) -> std::fmt::Result {
        out.push_str(r#"<section id="about" class="section about"><div class="container about-inner">"#);
        write!(
            out,
            r#"<img class="about-image" src="/images/destinations/Vacation-Planning.jpg" alt="{}" loading="lazy">
<div class="about-text">"#,
            self.t("about.imageAlt"),
        )?;
        self.section_heading(out, "about")?;
        write!(
            out,
            r#"<p>{}</p>
<p>{}</p>
<ul class="features">"#,
            self.t("about.paragraph1"),
            self.t("about.paragraph2"),
        )?;
        for key in ["personalized", "guides", "support"] {
            let title = format!("about.features.{key}.title");
            write!(
                out,
                r#"<li class="feature feature-{key}">{}</li>"#,
                Esc(self.translations.t(self.locale, &title)),
            )?;
        }
        write!(
            out,
            r##"</ul>
<a class="btn btn-outline" href="#contact">{}</a>
</div></div></section>
"##,
            self.t("about.cta"),
        )
    }

    fn packages(&self, out: &mut String) -> std::fmt::Result {
        out.push_str(r#"<section id="packages" class="section"><div class="container">"#);
        self.section_heading(out, "packages")?;
        writeln!(out, r#"<p class="section-subtitle">{}</p>"#, self.t("packages.subtitle"))?;

        match self.packages {
            None => {
                writeln!(out, r#"<p class="load-error">{}</p>"#, self.t("packages.loadError"))?;
            }
            Some([]) => {
                writeln!(out, r#"<p class="empty">{}</p>"#, self.t("packages.empty"))?;
            }
            Some(rows) => {
                let shown = if self.all_packages {
                    rows
                } else {
                    &rows[..rows.len().min(PACKAGES_PREVIEW)]
                };
                out.push_str(r#"<div class="card-grid">"#);
                for p in shown {
                    self.package_card(out, p)?;
                }
                out.push_str("</div>\n");
                if shown.len() < rows.len() {
                    write!(
                        out,
                        r##"<p class="load-more"><a class="btn btn-outline" href="/{}?packages=all#packages">{}</a></p>"##,
                        self.locale,
                        self.t("packages.loadMore"),
                    )?;
                }
            }
        }
        out.push_str("</div></section>\n");
        Ok(())
    }

    fn package_card(&self, out: &mut String, p: &Package) -> std::fmt::Result {
        let name = localized(self.locale, &p.name_en, &p.name_ar);
        let description = localized(self.locale, &p.description_en, &p.description_ar);
        out.push_str(r#"<article class="card package-card">"#);
        if !p.image.is_empty() {
            write!(out, r#"<img src="{}" alt="{}" loading="lazy">"#, Esc(&p.image), Esc(name))?;
        }
        write!(out, r#"<div class="card-body"><h3>{}</h3>"#, Esc(name))?;
        if !description.is_empty() {
            write!(out, r#"<p class="card-description">{}</p>"#, Esc(description))?;
        }
        if !p.days.is_empty() || !p.nights.is_empty() {
            write!(
                out,
                r#"<p class="card-meta"><span>{} {} / {} {}</span></p>"#,
                Esc(&p.days),
                self.t("packages.days"),
                Esc(&p.nights),
                self.t("packages.nights"),
            )?;
        }
        write!(
            out,
            r#"<p class="card-price">{} <strong>{}</strong></p>
<a class="btn btn-primary" href="{}" target="_blank" rel="noopener noreferrer">{}</a>
</div></article>
"#,
            self.t("packages.startFrom"),
            Esc(&p.price),
            self.whatsapp(),
            self.t("packages.bookNow"),
        )
    }

    fn gallery(&self, out: &mut String) -> std::fmt::Result {
        out.push_str(r#"<section id="gallery" class="section"><div class="container">"#);
        self.section_heading(out, "gallery")?;
        out.push_str(r#"<div class="gallery-grid">"#);
        for i in 1..=GALLERY_IMAGES {
            write!(
                out,
                r#"<img src="/images/gallery/{i}.jpg" alt="{} {i}" loading="lazy">"#,
                self.t("gallery.imageAlt"),
            )?;
        }
        out.push_str("</div></div></section>\n");
        Ok(())
    }

    fn testimonials(&self, out: &mut String) -> std::fmt::Result {
        out.push_str(r#"<section id="testimonials" class="section testimonials"><div class="container">"#);
        self.section_heading(out, "testimonials")?;
        write!(
            out,
            r#"<div class="testimonials-inner">
<img class="testimonials-image" src="/images/testimonials-main.jpg" alt="" loading="lazy">
<div class="reviews">
<p class="total-reviews">{}</p>
"#,
            self.t("testimonials.totalReviews"),
        )?;
        for key in REVIEWS {
            let name = self
                .translations
                .t(self.locale, &format!("testimonials.reviews.{key}.name"))
                .to_string();
            let comment = self
                .translations
                .t(self.locale, &format!("testimonials.reviews.{key}.comment"))
                .to_string();
            let initial: String = name.chars().next().map(String::from).unwrap_or_default();
            write!(
                out,
                r#"<blockquote class="review">
<div class="avatar" data-initial="{}"><img src="/images/testimonials/{key}.jpg" alt="{}" loading="lazy" onerror="this.remove()"></div>
<p class="stars" aria-label="{REVIEW_RATING}/5">{}</p>
<p>{}</p>
<cite>{}</cite>
</blockquote>
"#,
                Esc(&initial),
                Esc(&name),
                "★".repeat(REVIEW_RATING),
                Esc(&comment),
                Esc(&name),
            )?;
        }
        out.push_str("</div></div></div></section>\n");
        Ok(())
    }

    fn team(&self, out: &mut String) -> std::fmt::Result {
        write!(
            out,
            r#"<section id="team" class="section team"><div class="container">
<h2>{}</h2>
<article class="team-card">
<img src="/images/destinations/Alla-pic.jpg" alt="{}" loading="lazy">
<h3>{}</h3>
<p class="team-title">{}</p>
<ul class="team-stats">
<li><strong>{}</strong> {}</li>
<li><strong>{}</strong> {}</li>
<li><strong>{}</strong> {}</li>
</ul>
<a class="btn btn-primary" href="{}" target="_blank" rel="noopener noreferrer">{}</a>
<p class="team-social">
<a href="{}" target="_blank" rel="noopener noreferrer">Facebook</a>
<a href="{}" target="_blank" rel="noopener noreferrer">Instagram</a>
</p>
</article>
</div></section>
"#,
            self.t("team.title"),
            self.t("team.ceo.name"),
            self.t("team.ceo.name"),
            self.t("team.ceo.title"),
            self.t("team.ceo.stats.posts"),
            self.t("team.stats.postsLabel"),
            self.t("team.ceo.stats.followers"),
            self.t("team.stats.followersLabel"),
            self.t("team.ceo.stats.following"),
            self.t("team.stats.followingLabel"),
            self.t("team.ceo.social.facebook"),
            self.t("team.followButton"),
            self.t("team.ceo.social.facebook"),
            self.t("team.ceo.social.instagram"),
        )
    }

    fn contact(&self, out: &mut String) -> std::fmt::Result {
        write!(
            out,
            r#"<section id="contact" class="section contact"><div class="container contact-inner">
<form class="contact-form" method="post" action="/{}/contact">
<h2>{}</h2>
"#,
            self.locale,
            self.t("contact.title"),
        )?;
        match self.notice {
            Some(Notice::ContactSent) => writeln!(
                out,
                r#"<p class="notice notice-success" role="status">{}</p>"#,
                self.t("contact.successMessage")
            )?,
            Some(Notice::ContactError) => writeln!(
                out,
                r#"<p class="notice notice-error" role="alert">{}</p>"#,
                self.t("contact.errorMessage")
            )?,
            _ => {}
        }
        for (field, kind) in [("name", "text"), ("phone", "tel"), ("email", "email"), ("subject", "text")] {
            let label = format!("contact.form.{field}");
            write!(
                out,
                r#"<input type="{kind}" name="{field}" placeholder="{}" aria-label="{}" required>"#,
                Esc(self.translations.t(self.locale, &label)),
                Esc(self.translations.t(self.locale, &label)),
            )?;
        }
        write!(
            out,
            r#"<textarea name="comment" rows="5" placeholder="{}" aria-label="{}" required></textarea>
<button class="btn btn-primary" type="submit">{}</button>
</form>
<aside class="contact-info">
<h3>{}</h3>
<p><span>{}</span> <a href="tel:{}" dir="ltr">{}</a></p>
<p><span>{}</span> <a href="mailto:{}">{}</a></p>
<p><span>{}</span> {}</p>
<a class="map-link" href="{}" target="_blank" rel="noopener noreferrer">{}</a>
</aside>
</div></section>
"#,
            self.t("contact.form.comment"),
            self.t("contact.form.comment"),
            self.t("contact.form.submit"),
            self.t("contact.info.title"),
            self.t("contact.info.callUs"),
            Esc(&self.translations.t(self.locale, "contact.info.phone").replace(' ', "")),
            self.t("contact.info.phone"),
            self.t("contact.info.emailUs"),
            self.t("contact.info.email"),
            self.t("contact.info.email"),
            self.t("contact.info.location"),
            self.t("contact.info.address"),
            Esc(&self.config.maps_url),
            self.t("contact.mapLabel"),
        )
    }

    fn footer(&self, out: &mut String) -> std::fmt::Result {
        write!(
            out,
            r#"<footer id="footer" class="footer"><div class="container footer-grid">
<div><h3>{}</h3><p>{}</p></div>
<div><h3>{}</h3><ul>"#,
            self.t("footer.brand.name"),
            self.t("footer.brand.description"),
            self.t("footer.links.title"),
        )?;
        for (key, anchor) in NAV_ITEMS {
            let label = format!("footer.links.{key}");
            write!(
                out,
                r##"<li><a href="#{anchor}">{}</a></li>"##,
                Esc(self.translations.t(self.locale, &label)),
            )?;
        }
        write!(
            out,
            r#"</ul></div>
<div><h3>{}</h3><p dir="ltr">{}</p><p>{}</p><p>{}</p></div>
<div><h3>{}</h3><p>{}</p>
"#,
            self.t("footer.contact.title"),
            self.t("footer.contact.phone"),
            self.t("footer.contact.email"),
            self.t("footer.contact.address"),
            self.t("footer.newsletter.title"),
            self.t("footer.newsletter.description"),
        )?;
        match self.notice {
            Some(Notice::NewsletterSent) => writeln!(
                out,
                r#"<p class="notice notice-success" role="status">{}</p>"#,
                self.t("footer.newsletter.successMessage")
            )?,
            Some(Notice::NewsletterError) => writeln!(
                out,
                r#"<p class="notice notice-error" role="alert">{}</p>"#,
                self.t("footer.newsletter.errorMessage")
            )?,
            _ => {}
        }
        write!(
            out,
            r#"<form class="newsletter-form" method="post" action="/{}/newsletter">
<input type="text" name="name" placeholder="{}" aria-label="{}" required>
<input type="email" name="email" placeholder="{}" aria-label="{}" required>
<button class="btn btn-primary" type="submit">{}</button>
</form></div>
</div>
<p class="copyright">{}</p>
</footer>
"#,
            self.locale,
            self.t("footer.newsletter.namePlaceholder"),
            self.t("footer.newsletter.namePlaceholder"),
            self.t("footer.newsletter.emailPlaceholder"),
            self.t("footer.newsletter.emailPlaceholder"),
            self.t("footer.newsletter.subscribe"),
            self.t("footer.copyright"),
        )
    }

    fn whatsapp_button(&self, out: &mut String) -> std::fmt::Result {
        writeln!(
            out,
            r#"<a class="whatsapp-float" href="{}" target="_blank" rel="noopener noreferrer" aria-label="{}">WhatsApp</a>"#,
            self.whatsapp(),
            self.t("whatsapp.label"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn config() -> SiteConfig {
        SiteConfig::from_str(
            r#"
database_url: "mysql://u:p@localhost/travel"
admin_password_hash: "$2b$04$abcdefghijklmnopqrstuuF2Qh1cV0l9g3cY2CwM0wq6v0uL7nTq."
session_secret: "0123456789abcdef0123456789abcdef"
"#,
        )
        .unwrap()
    }

    fn package(n: usize) -> Package {
        crate::database::PackageDraft {
            name_en: format!("Package {n}"),
            name_ar: format!("باقة {n}"),
            price: "$500".into(),
            active: true,
            ..Default::default()
        }
        .into_package(format!("p{n}"), Utc::now())
    }

    fn page<'a>(
        t: &'a Translations,
        config: &'a SiteConfig,
        packages: &'a [Package],
        locale: Locale,
    ) -> HomePage<'a> {
        HomePage {
            locale,
            translations: t,
            config,
            destinations: Some(&[]),
            packages: Some(packages),
            all_packages: false,
            notice: None,
        }
    }

    #[test]
    fn test_notice_from_query() {
        assert_eq!(Notice::from_query(Some("contact"), None), Some(Notice::ContactSent));
        assert_eq!(
            Notice::from_query(None, Some("newsletter")),
            Some(Notice::NewsletterError)
        );
        assert_eq!(Notice::from_query(Some("other"), None), None);
    }

    #[test]
    fn test_arabic_page_is_rtl() {
        let t = Translations::embedded().unwrap();
        let config = config();
        let html = page(&t, &config, &[], Locale::Ar).render().unwrap();
        assert!(html.contains(r#"<html lang="ar" dir="rtl">"#));
        assert!(html.contains(r#"href="/en""#));
        assert!(html.contains("وجهات جديدة قريباً."));
    }

    #[test]
    fn test_packages_preview_and_load_more() {
        let t = Translations::embedded().unwrap();
        let config = config();
        let rows: Vec<Package> = (1..=8).map(package).collect();

        let html = page(&t, &config, &rows, Locale::En).render().unwrap();
        assert!(html.contains("Package 6"));
        assert!(!html.contains("Package 7"));
        assert!(html.contains("/en?packages=all#packages"));

        let mut all = page(&t, &config, &rows, Locale::En);
        all.all_packages = true;
        let html = all.render().unwrap();
        assert!(html.contains("Package 8"));
        assert!(!html.contains("packages=all"));
    }

    #[test]
    fn test_no_load_more_at_six() {
        let t = Translations::embedded().unwrap();
        let config = config();
        let rows: Vec<Package> = (1..=6).map(package).collect();
        let html = page(&t, &config, &rows, Locale::En).render().unwrap();
        assert!(!html.contains("packages=all"));
    }

    #[test]
    fn test_load_error_and_escaping() {
        let t = Translations::embedded().unwrap();
        let config = config();
        let mut rows = vec![package(1)];
        rows[0].name_en = "<script>x</script>".into();
        let mut home = page(&t, &config, &rows, Locale::En);
        home.destinations = None;
        let html = home.render().unwrap();
        assert!(html.contains("Failed to load destinations"));
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(!html.contains("<script>x"));
    }

    #[test]
    fn test_sections_in_order() {
        let t = Translations::embedded().unwrap();
        let config = config();
        let html = page(&t, &config, &[], Locale::En).render().unwrap();
        let ids = [
            "id=\"hero\"",
            "id=\"destinations\"",
            "id=\"about\"",
            "id=\"packages\"",
            "id=\"gallery\"",
            "id=\"testimonials\"",
            "id=\"team\"",
            "id=\"contact\"",
            "id=\"footer\"",
            "whatsapp-float",
        ];
        let positions: Vec<usize> = ids.iter().map(|id| html.find(id).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(html.matches("/images/gallery/").count(), GALLERY_IMAGES);
        assert_eq!(html.matches("class=\"review\"").count(), 3);
    }
}
