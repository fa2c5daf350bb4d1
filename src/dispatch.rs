//! Task dispatch: ordered keyword matching over the task text.
//!
//! The registry is an ordered list of `(predicate, routine)` pairs, built
//! once at startup and never mutated. The incoming task text is lowercased
//! and tested against each predicate in turn; the first match wins, so the
//! order below is part of the contract for ambiguous task text.

use std::sync::Arc;

use crate::handlers::{
    CountWednesdays, CreditCardNumber, DocsIndex, EmailSender, FetchApi, FilterCsv,
    FormatWithPrettier, GenerateData, GitCloneCommit, GoldTicketSales, Handler, MarkdownToHtml,
    RecentLogs, ResizeImage, RunSqlQuery, ScrapeWebsite, SimilarComments, SortContacts,
    TranscribeAudio,
};

/// Keyword predicate in disjunctive normal form: the task matches if any
/// clause matches, and a clause matches if the text contains all of its
/// keywords. Matching is done against the lowercased task text.
#[derive(Debug, Clone, Copy)]
pub struct Predicate {
    clauses: &'static [&'static [&'static str]],
}

impl Predicate {
    pub const fn any_of(clauses: &'static [&'static [&'static str]]) -> Self {
        Self { clauses }
    }

    pub fn matches(&self, lower_task: &str) -> bool {
        self.clauses
            .iter()
            .any(|clause| clause.iter().all(|keyword| lower_task.contains(keyword)))
    }
}

/// Ordered, read-only collection of `(predicate, routine)` pairs.
pub struct Registry {
    entries: Vec<(Predicate, Arc<dyn Handler>)>,
}

impl Registry {
    /// The standard routine set, in dispatch priority order.
    pub fn standard() -> Self {
        let entries: Vec<(Predicate, Arc<dyn Handler>)> = vec![
            (
                Predicate::any_of(&[&["datagen"], &["generate data"]]),
                Arc::new(GenerateData),
            ),
            (
                Predicate::any_of(&[&["format", "prettier"]]),
                Arc::new(FormatWithPrettier),
            ),
            (
                Predicate::any_of(&[&["wednesday"]]),
                Arc::new(CountWednesdays),
            ),
            (
                Predicate::any_of(&[&["contact", "sort"]]),
                Arc::new(SortContacts),
            ),
            (
                Predicate::any_of(&[&["log", "recent"]]),
                Arc::new(RecentLogs),
            ),
            (
                Predicate::any_of(&[&["markdown", "docs"]]),
                Arc::new(DocsIndex),
            ),
            (
                Predicate::any_of(&[&["email", "sender"]]),
                Arc::new(EmailSender),
            ),
            (
                Predicate::any_of(&[&["credit", "card"], &["credit_card.png"]]),
                Arc::new(CreditCardNumber),
            ),
            (
                Predicate::any_of(&[&["comment", "similar"]]),
                Arc::new(SimilarComments),
            ),
            (
                Predicate::any_of(&[&["ticket", "gold"]]),
                Arc::new(GoldTicketSales),
            ),
            (
                Predicate::any_of(&[&["fetch data"], &["api"]]),
                Arc::new(FetchApi),
            ),
            (
                Predicate::any_of(&[&["clone"], &["git"]]),
                Arc::new(GitCloneCommit),
            ),
            (
                Predicate::any_of(&[&["sql query"], &["run sql"]]),
                Arc::new(RunSqlQuery),
            ),
            (
                Predicate::any_of(&[&["scrape"], &["extract website"]]),
                Arc::new(ScrapeWebsite),
            ),
            (
                Predicate::any_of(&[&["resize image"], &["compress image"]]),
                Arc::new(ResizeImage),
            ),
            (
                Predicate::any_of(&[&["transcribe audio"]]),
                Arc::new(TranscribeAudio),
            ),
            (
                Predicate::any_of(&[&["convert markdown"], &["md to html"]]),
                Arc::new(MarkdownToHtml),
            ),
            (
                Predicate::any_of(&[&["filter csv"]]),
                Arc::new(FilterCsv),
            ),
        ];
        Self { entries }
    }

    /// Match `task` against the registry; the first matching routine wins.
    pub fn dispatch(&self, task: &str) -> Option<Arc<dyn Handler>> {
        let lower = task.to_lowercase();
        self.entries
            .iter()
            .find(|(predicate, _)| predicate.matches(&lower))
            .map(|(_, handler)| Arc::clone(handler))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatch_name(registry: &Registry, task: &str) -> Option<String> {
        registry.dispatch(task).map(|h| h.name().to_string())
    }

    #[test]
    fn sort_and_contact_route_to_the_contacts_routine() {
        let registry = Registry::standard();
        assert_eq!(
            dispatch_name(&registry, "Please sort the contact list"),
            Some("sort_contacts".to_string())
        );
        // Order of the keywords in the text does not matter.
        assert_eq!(
            dispatch_name(&registry, "contact records need a sort"),
            Some("sort_contacts".to_string())
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        let registry = Registry::standard();
        assert_eq!(
            dispatch_name(&registry, "Count the WEDNESDAY entries"),
            Some("count_wednesdays".to_string())
        );
    }

    #[test]
    fn unmatched_text_dispatches_to_nothing() {
        let registry = Registry::standard();
        assert_eq!(dispatch_name(&registry, "fold the laundry"), None);
    }

    #[test]
    fn registry_order_resolves_ambiguous_text() {
        let registry = Registry::standard();
        // Contains both "git" and "sql query"; the git entry comes first.
        assert_eq!(
            dispatch_name(&registry, "run sql query against the git checkout"),
            Some("git_clone_commit".to_string())
        );
        // "generate data" beats everything below it.
        assert_eq!(
            dispatch_name(&registry, "generate data and sort contacts"),
            Some("generate_data".to_string())
        );
    }

    #[test]
    fn credit_card_matches_either_clause() {
        let registry = Registry::standard();
        assert_eq!(
            dispatch_name(&registry, "extract the credit card number"),
            Some("credit_card_number".to_string())
        );
        assert_eq!(
            dispatch_name(&registry, "read the number in credit_card.png"),
            Some("credit_card_number".to_string())
        );
    }

    #[test]
    fn registry_covers_every_routine() {
        assert_eq!(Registry::standard().len(), 18);
    }
}
