//! `ScannerEngine` - the Dependency Scanner pipeline (spec.md §4.2).
//!
//! Grounded on the teacher's per-unit-of-work session discipline (spec.md §5:
//! every concurrent unit of work gets its own database session) and on
//! `vs_github::GitHubClient::list_tree_paths` as the "repo file API"
//! alternative to a shallow clone that step 2 explicitly allows.

use sqlx::PgPool;
use vs_core::ids::{LibraryId, ProjectId};
use vs_core::repo_ref::owner_repo;
use vs_core::{VsError, VsResult};
use vs_db::dao::{LibraryDao, ProjectDao, ProjectDependencyDao};
use vs_db::entities::Platform;
use vs_github::GitHubClient;

use crate::dependency::ScannedDependency;
use crate::parser::ParserRegistry;

/// One project's scan outcome, returned for caller visibility (spec.md §4.2
/// step 6: unresolvable dependencies are surfaced, not silently dropped).
#[derive(Debug, Default)]
pub struct ScanReport {
    pub project_id: Option<ProjectId>,
    pub synced_library_count: usize,
    pub unresolvable: Vec<ScannedDependency>,
    pub deleted_vanished_count: u64,
}

pub struct ScannerEngine<'a> {
    pool: &'a PgPool,
    github: &'a GitHubClient,
    registry: ParserRegistry,
}

impl<'a> ScannerEngine<'a> {
    #[must_use]
    pub fn new(pool: &'a PgPool, github: &'a GitHubClient) -> Self {
        Self {
            pool,
            github,
            registry: ParserRegistry::with_builtins(),
        }
    }

    /// Run the full pipeline for one project (spec.md §4.2 steps 1-8).
    pub async fn scan_project(&self, project_id: ProjectId) -> VsResult<ScanReport> {
        let project_dao = ProjectDao::new(self.pool);

        // Step 1: load, skip if auto_sync_deps = false, resolve ref.
        let Some(project) = project_dao.find_by_id(project_id).await? else {
            return Ok(ScanReport::default());
        };
        if !project.auto_sync_deps {
            return Ok(ScanReport::default());
        }
        let git_ref = project.scan_ref().to_string();

        if project.platform != Platform::Github {
            return Err(VsError::Internal(anyhow::anyhow!(
                "scanner only supports the github platform (spec.md §3)"
            )));
        }
        let (owner, repo) = owner_repo(&project.repo_url)?;

        // Step 2/3: discover manifests via the repo file API (tree walk).
        let paths = self.github.list_tree_paths(&owner, &repo, &git_ref).await?;
        let manifest_paths: Vec<&String> = paths
            .iter()
            .filter(|path| self.registry.parsers_for(path.as_str()).next().is_some())
            .collect();

        // Step 4: parse every matched manifest.
        let mut resolvable: Vec<ScannedDependency> = Vec::new();
        let mut unresolvable: Vec<ScannedDependency> = Vec::new();

        for path in manifest_paths {
            let content = match self.github.file_content(&owner, &repo, path, &git_ref).await {
                Ok(content) => content,
                Err(err) => {
                    tracing::warn!(project_id = %project_id, path, error = %err, "failed to fetch manifest, skipping");
                    continue;
                }
            };

            for parser in self.registry.parsers_for(path) {
                match parser.parse(path, &content) {
                    Ok(deps) => {
                        for dep in deps {
                            if dep.is_resolvable() {
                                resolvable.push(dep);
                            } else {
                                unresolvable.push(dep);
                            }
                        }
                    }
                    Err(err) => {
                        tracing::warn!(project_id = %project_id, path, error = %err, "manifest parse failed, skipping file");
                    }
                }
            }
        }

        // Step 5: upsert libraries and project-dependency rows.
        let library_dao = LibraryDao::new(self.pool);
        let dependency_dao = ProjectDependencyDao::new(self.pool);
        let mut synced_library_ids: Vec<LibraryId> = Vec::new();

        for dep in resolvable {
            let repo_url = dep
                .library_repo_url
                .as_deref()
                .expect("resolvable dependencies always carry a repo url");

            // The scanner only learns a dependency's repo URL, never its
            // default branch; "main" is a starting guess a later Collector
            // pass corrects once the library itself is scheduled for
            // collection.
            let library = match library_dao
                .upsert(&dep.library_name, repo_url, Platform::Github, "main")
                .await
            {
                Ok(library) => library,
                Err(VsError::IdempotencyConflict(msg)) => {
                    tracing::warn!(project_id = %project_id, library = %dep.library_name, %msg, "skipping dependency with conflicting repo url");
                    continue;
                }
                Err(err) => return Err(err),
            };

            dependency_dao
                .upsert_from_scan(
                    project_id,
                    library.id,
                    dep.constraint_expr.as_deref(),
                    dep.resolved_version.as_deref(),
                    dep.detection_method,
                )
                .await?;

            synced_library_ids.push(library.id);
        }

        // Step 7: delete rows that vanished from the manifest set.
        let deleted = dependency_dao.delete_vanished(project_id, &synced_library_ids).await?;

        // Step 8: mark the project scanned.
        project_dao.mark_scanned(project_id).await?;

        Ok(ScanReport {
            project_id: Some(project_id),
            synced_library_count: synced_library_ids.len(),
            unresolvable,
            deleted_vanished_count: deleted,
        })
    }

    /// Run every project due for a scan (spec.md §4.2 "Triggers": scheduler
    /// runs per-project every hour). One project's failure is logged and
    /// does not abort the batch (spec.md §4.2 "Failure semantics").
    pub async fn scan_due_projects(&self, window: chrono::Duration) -> VsResult<Vec<ScanReport>> {
        let project_dao = ProjectDao::new(self.pool);
        let due = project_dao.list_due_for_scan(window).await?;

        let mut reports = Vec::with_capacity(due.len());
        for project in due {
            match self.scan_project(project.id).await {
                Ok(report) => reports.push(report),
                Err(err) => {
                    tracing::error!(project_id = %project.id, error = %err, "dependency scan failed for project");
                }
            }
        }
        Ok(reports)
    }
}
