//! The explicitly constructed editing session for all datasets.
//!
//! One workbook per process replaces any global mutable dataset context: it
//! owns one sheet editor per dataset, the shared cache mirror, and the shared
//! error slot.

use std::path::Path;
use std::sync::Arc;

use tally_domain::{seed_budget, seed_projects, seed_subscriptions, BudgetLine, Project, Record, Subscription};

use crate::cache::CacheMirror;
use crate::config::RemoteConfig;
use crate::editor::SheetEditor;
use crate::error::Result;
use crate::remote::HttpRemote;
use crate::sync::{ErrorSlot, SyncEngine};

pub struct Workbook {
    pub projects: SheetEditor<Project, HttpRemote>,
    pub subscriptions: SheetEditor<Subscription, HttpRemote>,
    pub budget: SheetEditor<BudgetLine, HttpRemote>,
    errors: ErrorSlot,
}

impl Workbook {
    /// Open (or create) the cache mirror and wire up one editor per dataset.
    /// The budget summary has no per-row remote routes; its rows sync only
    /// through bulk submit.
    pub fn open(config: &RemoteConfig, cache_path: &Path) -> Result<Self> {
        let mirror = Arc::new(CacheMirror::open(cache_path)?);
        let errors = ErrorSlot::default();

        let projects = SheetEditor::new(SyncEngine::new(
            HttpRemote::per_row(config, Project::DATASET),
            Arc::clone(&mirror),
            seed_projects(),
            errors.clone(),
        ));
        let subscriptions = SheetEditor::new(SyncEngine::new(
            HttpRemote::per_row(config, Subscription::DATASET),
            Arc::clone(&mirror),
            seed_subscriptions(),
            errors.clone(),
        ));
        let budget = SheetEditor::new(SyncEngine::new(
            HttpRemote::snapshot(config, BudgetLine::DATASET),
            Arc::clone(&mirror),
            seed_budget(),
            errors.clone(),
        ));

        Ok(Self {
            projects,
            subscriptions,
            budget,
            errors,
        })
    }

    /// Load every dataset (remote → mirror → defaults, per dataset).
    pub async fn load_all(&mut self) -> Result<()> {
        self.projects.load().await?;
        self.subscriptions.load().await?;
        self.budget.load().await?;
        Ok(())
    }

    /// The latest surfaced sync failure, if any.
    pub fn error_message(&self) -> Option<String> {
        self.errors.message()
    }

    pub fn clear_error(&self) {
        self.errors.clear();
    }
}
