//! Markdown listing of aggregated pages.

use crate::models::{Article, ArticlesPage, Filter, SectionInfo};
use crate::utils::display_date;
use std::fmt::Write;

/// Render a page of results, one entry per article, followed by the
/// pagination footer.
pub fn page_to_markdown(page: &ArticlesPage, filter: &Filter, search_query: &str) -> String {
    let mut md = String::new();
    let _ = writeln!(md, "# News");

    let mut facets = Vec::new();
    if !search_query.trim().is_empty() {
        facets.push(format!("search: \"{}\"", search_query.trim()));
    }
    if let Some(category) = filter.category_restriction() {
        facets.push(format!("category: {category}"));
    }
    if !filter.selects_all_sources() {
        facets.push(format!("source: {}", filter.source));
    }
    facets.push(format!("date range: {}", filter.date_range));
    facets.push(format!("sort: {}", filter.sort_by));
    let _ = writeln!(md, "\n_{}_\n", facets.join(" · "));

    if page.articles.is_empty() {
        let _ = writeln!(md, "No articles found.");
    }
    for article in &page.articles {
        push_article(&mut md, article);
    }

    let p = &page.pagination;
    let _ = writeln!(
        md,
        "---\nPage {} of {} ({} results, {} per page)",
        p.current_page, p.total_pages, p.total_results, p.page_size
    );
    md
}

fn push_article(md: &mut String, article: &Article) {
    let _ = writeln!(md, "## [{}]({})", article.title, article.url);
    let _ = writeln!(
        md,
        "<small>{} · {} · {} · {}</small>\n",
        article.source.name,
        article.author,
        display_date(article),
        article.category
    );
    let _ = writeln!(md, "{}\n", article.description);
}

/// Bulleted `name` / `id` listing under a `# {title}` heading.
pub fn sections_to_markdown(title: &str, sections: &[SectionInfo]) -> String {
    let mut md = String::new();
    let _ = writeln!(md, "# {title}\n");
    for section in sections {
        let _ = writeln!(md, "- **{}** `{}`", section.name, section.id);
    }
    md
}
