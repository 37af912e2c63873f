//! Builds safe OData filter expressions for the managed search service.

use codeindex_domain::value_objects::FilterExpr;

use crate::hybrid_search::is_suspicious;

/// Configuration for `FilterManager::repository`.
///
/// Rather than hard-coding a `venv/` exclusion for one specific
/// repository, any repository whose name appears in
/// `excluded_path_substrings_by_repo` gets its matching path substrings
/// excluded via `not search.ismatch(...)`.
#[derive(Debug, Clone, Default)]
pub struct FilterManagerConfig {
    /// Repository name (lowercased) -> path substrings to exclude from
    /// that repository's matches, e.g. `"myrepo" -> ["venv/", "node_modules/"]`.
    pub excluded_path_substrings_by_repo: Vec<(String, Vec<String>)>,
}

/// Stateless filter-clause builder. All methods are free functions in
/// spirit; `FilterManager` only carries the exclusion configuration.
pub struct FilterManager {
    config: FilterManagerConfig,
}

impl FilterManager {
    /// Build a manager with the given exclusion configuration.
    pub fn new(config: FilterManagerConfig) -> Self {
        Self { config }
    }

    fn excluded_substrings_for(&self, repository: &str) -> Vec<String> {
        let lower = repository.to_lowercase();
        self.config
            .excluded_path_substrings_by_repo
            .iter()
            .find(|(name, _)| name.to_lowercase() == lower)
            .map(|(_, substrings)| substrings.clone())
            .unwrap_or_default()
    }

    /// Repository filter clause with robust matching: exact match on
    /// `repository`, falling back to text match on `repository` and
    /// `file_path` to accommodate values stored as `owner/repo` or
    /// path-embedded. Any configured excluded path substrings for this
    /// repository are ANDed in as negated `file_path` matches.
    pub fn repository(&self, repository: Option<&str>) -> Option<FilterExpr> {
        let repository = repository?;
        if repository.is_empty() {
            return None;
        }

        let excluded = self.excluded_substrings_for(repository);
        let base = if repository.contains('/') {
            // Already looks like "owner/repo": prefer exact match only.
            FilterExpr::eq("repository", repository)
        } else {
            FilterExpr::Or(vec![
                FilterExpr::eq("repository", repository),
                FilterExpr::is_match(repository, "repository"),
                FilterExpr::is_match(repository, "file_path"),
            ])
        };

        if excluded.is_empty() {
            return Some(base);
        }

        let mut parts = vec![base];
        for substring in excluded {
            parts.push(FilterExpr::Not(Box::new(FilterExpr::is_match(&substring, "file_path"))));
        }
        Some(FilterExpr::And(parts))
    }

    /// `language eq '<language>'`.
    pub fn language(&self, language: Option<&str>) -> Option<FilterExpr> {
        let language = language?;
        if language.is_empty() {
            return None;
        }
        Some(FilterExpr::eq("language", language))
    }

    /// `framework eq '<framework>'`.
    pub fn framework(&self, framework: Option<&str>) -> Option<FilterExpr> {
        let framework = framework?;
        if framework.is_empty() {
            return None;
        }
        Some(FilterExpr::eq("framework", framework))
    }

    /// AND-of-NOTs excluding `terms` from both `content` and `tags`.
    pub fn exclude_terms(&self, terms: &[String]) -> Option<FilterExpr> {
        if terms.is_empty() {
            return None;
        }
        let mut parts = Vec::with_capacity(terms.len() * 2);
        for term in terms {
            parts.push(FilterExpr::Not(Box::new(FilterExpr::is_match(term, "content"))));
            parts.push(FilterExpr::Not(Box::new(FilterExpr::is_match(term, "tags"))));
        }
        Some(FilterExpr::And(parts))
    }

    /// AND-of-ORs requiring every term in `terms` to match at least one
    /// of `content`, `function_name`, `class_name`, `docstring`.
    ///
    /// A term containing a filter-injection pattern (`is_suspicious`)
    /// never reaches `search.ismatch`: its clause is replaced with
    /// `FilterExpr::NoMatch` so the term cannot affect what the service
    /// receives.
    pub fn exact_terms(&self, terms: &[String]) -> Option<FilterExpr> {
        if terms.is_empty() {
            return None;
        }
        let clauses: Vec<FilterExpr> = terms
            .iter()
            .map(|term| {
                if is_suspicious(term) {
                    return FilterExpr::NoMatch;
                }
                FilterExpr::Or(vec![
                    FilterExpr::is_match(term, "content"),
                    FilterExpr::is_match(term, "function_name"),
                    FilterExpr::is_match(term, "class_name"),
                    FilterExpr::is_match(term, "docstring"),
                ])
            })
            .collect();
        Some(FilterExpr::And(clauses))
    }

    /// AND together every `Some` clause; `None` if nothing was supplied.
    pub fn combine_and(clauses: Vec<Option<FilterExpr>>) -> Option<FilterExpr> {
        let kept: Vec<FilterExpr> = clauses.into_iter().flatten().collect();
        match kept.len() {
            0 => None,
            1 => kept.into_iter().next(),
            _ => Some(FilterExpr::And(kept)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> FilterManager {
        FilterManager::new(FilterManagerConfig::default())
    }

    #[test]
    fn repository_with_slash_is_exact_match_only() {
        let clause = manager().repository(Some("owner/repo")).unwrap();
        assert_eq!(clause.render(), "repository eq 'owner/repo'");
    }

    #[test]
    fn repository_without_slash_matches_three_ways() {
        let clause = manager().repository(Some("myrepo")).unwrap();
        assert_eq!(
            clause.render(),
            "(repository eq 'myrepo') or (search.ismatch('myrepo', 'repository')) or (search.ismatch('myrepo', 'file_path'))"
        );
    }

    #[test]
    fn repository_exclusion_is_configurable_not_hardcoded() {
        let config = FilterManagerConfig {
            excluded_path_substrings_by_repo: vec![("myrepo".to_string(), vec!["venv/".to_string()])],
        };
        let clause = FilterManager::new(config).repository(Some("myrepo")).unwrap();
        assert!(clause.render().contains("not (search.ismatch('venv/', 'file_path'))"));
    }

    #[test]
    fn exact_terms_requires_every_term_to_match() {
        let terms = vec!["foo".to_string(), "bar".to_string()];
        let clause = manager().exact_terms(&terms).unwrap();
        let rendered = clause.render();
        assert!(rendered.contains("'foo'"));
        assert!(rendered.contains("'bar'"));
        assert!(rendered.contains(" and "));
    }

    #[test]
    fn a_suspicious_exact_term_renders_as_no_match_not_raw_content() {
        let terms = vec!["' or '1'='1".to_string()];
        let clause = manager().exact_terms(&terms).unwrap();
        assert_eq!(clause.render(), "(1 eq 0)");
    }

    #[test]
    fn combine_and_of_none_is_none() {
        assert!(FilterManager::combine_and(vec![None, None]).is_none());
    }

    #[test]
    fn combine_and_of_one_is_unwrapped() {
        let only = FilterExpr::eq("language", "rust");
        let combined = FilterManager::combine_and(vec![Some(only.clone())]).unwrap();
        assert_eq!(combined, only);
    }
}
