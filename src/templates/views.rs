//! Page views - context building and rendering for every route

use anyhow::Result;
use chrono::{Datelike, Utc};
use tera::Context;

use super::{
    ContactData, JobData, MenuItem, NotFoundData, PageData, PostData, SeoData, SiteData,
    TemplateRenderer,
};
use crate::config::SiteConfig;
use crate::content::{Page, PostDetail, PostSummary};
use crate::helpers::{self, mailto};
use crate::render::HtmlRenderer;

/// Renders full HTML documents for the blog, static pages, careers, and
/// contact routes
pub struct Views {
    config: SiteConfig,
    templates: TemplateRenderer,
    blocks: HtmlRenderer,
}

impl Views {
    pub fn new(config: &SiteConfig) -> Result<Self> {
        Ok(Self {
            templates: TemplateRenderer::new(&config.date_format)?,
            blocks: HtmlRenderer::new(),
            config: config.clone(),
        })
    }

    pub fn blocks(&self) -> &HtmlRenderer {
        &self.blocks
    }

    fn site_data(&self) -> SiteData {
        let config = &self.config;
        SiteData {
            title: config.title.clone(),
            description: config.description.clone(),
            language: config.language.clone(),
            root: helpers::url_for(config, ""),
            url: config.url.clone(),
            year: Utc::now().year().to_string(),
            generator: helpers::meta_generator(),
            menu: vec![
                MenuItem {
                    name: "Blog".to_string(),
                    path: helpers::url_for(config, &helpers::blog_path(config)),
                },
                MenuItem {
                    name: "Careers".to_string(),
                    path: helpers::url_for(config, "careers/"),
                },
                MenuItem {
                    name: "Contact".to_string(),
                    path: helpers::url_for(config, "contact/"),
                },
            ],
        }
    }

    /// `{title} — {site}`, or just the site title
    fn seo(
        &self,
        title: Option<&str>,
        description: Option<&str>,
        path: &str,
        image: Option<&str>,
    ) -> SeoData {
        let site = &self.config.title;
        let full_title = match title {
            Some(t) if !t.is_empty() => format!("{} — {}", t, site),
            _ => site.clone(),
        };
        let description = description
            .filter(|d| !d.is_empty())
            .unwrap_or(&self.config.description)
            .to_string();
        let url = helpers::full_url_for(&self.config, path);
        let kind = if image.is_some() { "article" } else { "website" };

        SeoData {
            open_graph: helpers::open_graph(
                title.unwrap_or(site),
                &description,
                &url,
                image,
                site,
                kind,
            ),
            title: full_title,
            description,
            url: helpers::html_escape(&url),
        }
    }

    fn context(&self, seo: SeoData) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site_data());
        context.insert("seo", &seo);
        context
    }

    fn post_data(&self, post: &PostSummary) -> PostData {
        PostData {
            path: helpers::url_for(&self.config, &helpers::post_path(&self.config, &post.slug)),
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            date: post.date.clone(),
            tags: post.tags.clone(),
            author: post.author.clone(),
            cover: post.cover.as_deref().map(helpers::html_escape),
            source_url: helpers::html_escape(&post.url),
        }
    }

    /// Blog list page
    pub fn blog_index(&self, posts: &[PostSummary]) -> Result<String> {
        let path = helpers::blog_path(&self.config);
        let mut context = self.context(self.seo(Some("Blog"), None, &path, None));
        let posts: Vec<PostData> = posts.iter().map(|p| self.post_data(p)).collect();
        context.insert("posts", &posts);
        self.templates.render("blog_index.html", &context)
    }

    /// Post detail page with its rendered body
    pub fn post(&self, detail: &PostDetail) -> Result<String> {
        let post = &detail.summary;
        let path = helpers::post_path(&self.config, &post.slug);
        let seo = self.seo(
            Some(&post.title),
            post.excerpt.as_deref(),
            &path,
            post.cover.as_deref(),
        );

        let mut context = self.context(seo);
        context.insert("post", &self.post_data(post));
        context.insert("content", &self.blocks.render_blocks(&detail.blocks));
        context.insert(
            "blog_path",
            &helpers::url_for(&self.config, &helpers::blog_path(&self.config)),
        );
        self.templates.render("post.html", &context)
    }

    /// Shown for a slug with no published post
    pub fn post_not_found(&self) -> Result<String> {
        self.not_found_page(NotFoundData {
            heading: "Post not found".to_string(),
            message: "This post doesn't exist or is no longer published.".to_string(),
            back_path: helpers::url_for(&self.config, &helpers::blog_path(&self.config)),
            back_label: "← Back to Blog".to_string(),
        })
    }

    /// Site-wide 404 page
    pub fn not_found(&self) -> Result<String> {
        self.not_found_page(NotFoundData {
            heading: "Page not found".to_string(),
            message: "The page you're looking for doesn't exist.".to_string(),
            back_path: helpers::url_for(&self.config, ""),
            back_label: "← Back home".to_string(),
        })
    }

    fn not_found_page(&self, data: NotFoundData) -> Result<String> {
        let mut context = self.context(self.seo(Some(&data.heading), None, "404.html", None));
        context.insert("heading", &data.heading);
        context.insert("message", &data.message);
        context.insert("back_path", &data.back_path);
        context.insert("back_label", &data.back_label);
        self.templates.render("not_found.html", &context)
    }

    /// Static markdown page
    pub fn page(&self, page: &Page) -> Result<String> {
        let seo = self.seo(Some(&page.title), page.description.as_deref(), &page.path, None);
        let mut context = self.context(seo);
        context.insert(
            "page",
            &PageData {
                title: page.title.clone(),
                path: helpers::url_for(&self.config, &page.path),
                content: page.content.clone(),
            },
        );
        self.templates.render(&format!("{}.html", page_template(&page.layout)), &context)
    }

    /// Open roles and the ambassador program
    pub fn careers(&self) -> Result<String> {
        let mut context = self.context(self.seo(Some("Careers"), None, "careers/", None));

        let jobs: Vec<JobData> = self
            .config
            .jobs
            .iter()
            .map(|job| JobData {
                id: job.id.clone(),
                title: job.title.clone(),
                dept: job.dept.clone(),
                meta: [&job.location, &job.kind, &job.mode]
                    .into_iter()
                    .filter(|s| !s.is_empty())
                    .cloned()
                    .collect(),
                summary: job.summary.clone(),
                responsibilities: job.responsibilities.clone(),
                requirements: job.requirements.clone(),
                posted: job.posted.clone(),
                apply: mailto::job_application(&self.config, job),
            })
            .collect();

        context.insert("jobs", &jobs);
        context.insert("careers_email", &self.config.careers_email);
        context.insert("ambassador_apply", &mailto::ambassador_application(&self.config));
        self.templates.render("careers.html", &context)
    }

    /// Contact channels and the security report link
    pub fn contact(&self) -> Result<String> {
        let mut context = self.context(self.seo(Some("Contact"), None, "contact/", None));

        let contacts: Vec<ContactData> = self
            .config
            .contacts
            .iter()
            .map(|channel| ContactData {
                title: channel.title.clone(),
                summary: channel.summary.clone(),
                cta: channel
                    .cta
                    .clone()
                    .unwrap_or_else(|| format!("Email {}", channel.email)),
                href: mailto::contact(&self.config, channel),
            })
            .collect();

        context.insert("contacts", &contacts);
        context.insert("security_email", &self.config.security_email);
        context.insert("security_report", &mailto::security_report(&self.config));
        self.templates.render("contact.html", &context)
    }
}

/// Only `page` is a page layout; other layout names fall back to it
fn page_template(layout: &str) -> &'static str {
    match layout {
        "page" => "page",
        other => {
            tracing::debug!("Unknown page layout {:?}, using page", other);
            "page"
        }
    }
}
