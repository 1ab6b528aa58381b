// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profiles, credentials, token versions)
//! - Projects (embedded membership, transactional member mutations)
//! - Todos, board columns/tasks, health logs
//! - Streaks (transactional per-day advance)
//! - Activity log (best-effort telemetry)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{
    ActivityEvent, BoardColumn, BoardTask, HealthLog, Project, Streak, Todo, User,
};
use chrono::NaiveDate;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated
        // connection to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Clone the client bound to an open transaction so selects join its
    /// read set. Reads through the plain client would leave the commit
    /// with nothing to validate against, turning the write into a blind
    /// overwrite.
    fn transactional_reader(
        client: &firestore::FirestoreDb,
        transaction: &firestore::FirestoreTransaction<'_>,
    ) -> firestore::FirestoreDb {
        client.clone_with_consistency_selector(
            firestore::FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ),
        )
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by document ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Look up a user by normalized email. Emails are stored lowercased,
    /// so this is an exact-match query.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.to_string();
        let mut users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.for_all([q.field("email").eq(email.clone())]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.pop())
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment a user's refresh-token version inside a transaction,
    /// invalidating every refresh token minted with the old stamp.
    ///
    /// Returns the new version.
    pub async fn bump_token_version(&self, user_id: &str) -> Result<u32, AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let mut user: User = Self::transactional_reader(client, &transaction)
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        user.token_version = user.token_version.wrapping_add(1);

        client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(&user)
            .add_to_transaction(&mut transaction)
            .map_err(|e| AppError::Database(format!("Failed to add user to transaction: {}", e)))?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok(user.token_version)
    }

    // ─── Project Operations ──────────────────────────────────────

    /// Get a project by document ID.
    pub async fn get_project(&self, project_id: &str) -> Result<Option<Project>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::PROJECTS)
            .obj()
            .one(project_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List every project the user is a member of.
    pub async fn list_projects_for_member(&self, user_id: &str) -> Result<Vec<Project>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::PROJECTS)
            .filter(move |q| q.for_all([q.field("member_ids").array_contains(user_id.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a project.
    pub async fn upsert_project(&self, project: &Project) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PROJECTS)
            .document_id(&project.id)
            .object(project)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Apply a mutation to the project document inside a transaction.
    ///
    /// The read joins the transaction's read set, so the read-check-write
    /// is one atomic unit: a concurrent commit that touched the document
    /// aborts this one instead of racing past the last-admin invariant.
    ///
    /// The closure returns the typed error to surface when its check
    /// fails; nothing is written in that case.
    pub async fn update_project_atomic<F>(
        &self,
        project_id: &str,
        mutate: F,
    ) -> Result<Project, AppError>
    where
        F: FnOnce(&mut Project) -> Result<(), AppError>,
    {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let mut project: Project = Self::transactional_reader(client, &transaction)
            .fluent()
            .select()
            .by_id_in(collections::PROJECTS)
            .obj()
            .one(project_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Project {} not found", project_id)))?;

        if let Err(err) = mutate(&mut project) {
            let _ = transaction.rollback().await;
            return Err(err);
        }

        client
            .fluent()
            .update()
            .in_col(collections::PROJECTS)
            .document_id(&project.id)
            .object(&project)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add project to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok(project)
    }

    /// Delete a project and all of its board columns, tasks, and
    /// project-scoped todos.
    ///
    /// Returns the number of documents deleted.
    pub async fn delete_project_cascade(&self, project_id: &str) -> Result<usize, AppError> {
        let mut deleted_count = 0;

        let columns = self.list_board_columns(project_id).await?;
        let count = columns.len();
        self.batch_delete(&columns, collections::BOARD_COLUMNS, |c: &BoardColumn| {
            c.id.clone()
        })
        .await?;
        deleted_count += count;
        tracing::debug!(project_id, count, "Deleted board columns");

        let tasks = self.list_board_tasks(project_id).await?;
        let count = tasks.len();
        self.batch_delete(&tasks, collections::BOARD_TASKS, |t: &BoardTask| {
            t.id.clone()
        })
        .await?;
        deleted_count += count;
        tracing::debug!(project_id, count, "Deleted board tasks");

        let todos = self.list_todos_for_project(project_id).await?;
        let count = todos.len();
        self.batch_delete(&todos, collections::TODOS, |t: &Todo| t.id.clone())
            .await?;
        deleted_count += count;
        tracing::debug!(project_id, count, "Deleted project todos");

        self.get_client()?
            .fluent()
            .delete()
            .from(collections::PROJECTS)
            .document_id(project_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        deleted_count += 1;

        tracing::info!(project_id, deleted_count, "Project deletion complete");

        Ok(deleted_count)
    }

    // ─── Todo Operations ─────────────────────────────────────────

    /// Get a todo by document ID.
    pub async fn get_todo(&self, todo_id: &str) -> Result<Option<Todo>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::TODOS)
            .obj()
            .one(todo_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List a user's inbox todos (no project attached).
    pub async fn list_inbox_todos(&self, owner_id: &str) -> Result<Vec<Todo>, AppError> {
        let owner_id = owner_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::TODOS)
            .filter(move |q| {
                q.for_all([
                    q.field("owner_id").eq(owner_id.clone()),
                    q.field("project_id").is_null(),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List todos attached to a project.
    pub async fn list_todos_for_project(&self, project_id: &str) -> Result<Vec<Todo>, AppError> {
        let project_id = project_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::TODOS)
            .filter(move |q| q.for_all([q.field("project_id").eq(project_id.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a todo.
    pub async fn upsert_todo(&self, todo: &Todo) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::TODOS)
            .document_id(&todo.id)
            .object(todo)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a todo.
    pub async fn delete_todo(&self, todo_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::TODOS)
            .document_id(todo_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Board Operations ────────────────────────────────────────

    /// List a project's board columns, lowest order first.
    pub async fn list_board_columns(
        &self,
        project_id: &str,
    ) -> Result<Vec<BoardColumn>, AppError> {
        let project_id = project_id.to_string();
        let mut columns: Vec<BoardColumn> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::BOARD_COLUMNS)
            .filter(move |q| q.for_all([q.field("project_id").eq(project_id.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        columns.sort_by_key(|c| c.order);
        Ok(columns)
    }

    /// Get a board column by document ID.
    pub async fn get_board_column(
        &self,
        column_id: &str,
    ) -> Result<Option<BoardColumn>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::BOARD_COLUMNS)
            .obj()
            .one(column_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Write the default column triple in one transaction so a board is
    /// never half-initialized.
    pub async fn insert_board_columns(&self, columns: &[BoardColumn]) -> Result<(), AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        for column in columns {
            client
                .fluent()
                .update()
                .in_col(collections::BOARD_COLUMNS)
                .document_id(&column.id)
                .object(column)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add column to transaction: {}", e))
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok(())
    }

    /// Get a board task by document ID.
    pub async fn get_board_task(&self, task_id: &str) -> Result<Option<BoardTask>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::BOARD_TASKS)
            .obj()
            .one(task_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List a project's board tasks.
    pub async fn list_board_tasks(&self, project_id: &str) -> Result<Vec<BoardTask>, AppError> {
        let project_id = project_id.to_string();
        let mut tasks: Vec<BoardTask> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::BOARD_TASKS)
            .filter(move |q| q.for_all([q.field("project_id").eq(project_id.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tasks.sort_by_key(|t| t.order);
        Ok(tasks)
    }

    /// Create or update a board task.
    pub async fn upsert_board_task(&self, task: &BoardTask) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::BOARD_TASKS)
            .document_id(&task.id)
            .object(task)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a board task.
    pub async fn delete_board_task(&self, task_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::BOARD_TASKS)
            .document_id(task_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Health Log Operations ───────────────────────────────────

    /// Get a health log by document ID.
    pub async fn get_health_log(&self, log_id: &str) -> Result<Option<HealthLog>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::HEALTH_LOGS)
            .obj()
            .one(log_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List a user's health logs, optionally filtered by kind tag.
    pub async fn list_health_logs(
        &self,
        user_id: &str,
        kind: Option<&str>,
    ) -> Result<Vec<HealthLog>, AppError> {
        let user_id = user_id.to_string();
        let kind = kind.map(|k| k.to_string());

        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::HEALTH_LOGS);

        let query = if let Some(kind) = kind {
            query.filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    q.field("type").eq(kind.clone()),
                ])
            })
        } else {
            query.filter(move |q| q.for_all([q.field("user_id").eq(user_id.clone())]))
        };

        query
            .order_by([(
                "logged_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a health log.
    pub async fn upsert_health_log(&self, log: &HealthLog) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::HEALTH_LOGS)
            .document_id(&log.id)
            .object(log)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a health log.
    pub async fn delete_health_log(&self, log_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::HEALTH_LOGS)
            .document_id(log_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Streak Operations ───────────────────────────────────────

    /// Get a user's streak document, if any.
    pub async fn get_streak(&self, user_id: &str) -> Result<Option<Streak>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::STREAKS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Advance a user's streak for a qualifying activity on the given UTC
    /// day, atomically.
    ///
    /// The read + transition + write run inside a Firestore transaction
    /// with the read bound to it; of two concurrent advances for the same
    /// day, one commits and the other either aborts or observes the
    /// updated document and no-ops. Same-day repeats roll back without
    /// writing.
    pub async fn advance_streak(
        &self,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<Streak, AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let mut streak: Streak = Self::transactional_reader(client, &transaction)
            .fluent()
            .select()
            .by_id_in(collections::STREAKS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .unwrap_or_else(|| Streak::zeroed(user_id.to_string()));

        if !streak.advance(day) {
            // Same-day repeat: nothing to write.
            let _ = transaction.rollback().await;
            tracing::debug!(user_id, %day, "Streak already advanced today (idempotent skip)");
            return Ok(streak);
        }

        client
            .fluent()
            .update()
            .in_col(collections::STREAKS)
            .document_id(user_id)
            .object(&streak)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add streak to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            user_id,
            current = streak.current,
            longest = streak.longest,
            "Streak advanced"
        );

        Ok(streak)
    }

    // ─── Activity Log Operations ─────────────────────────────────

    /// Append an activity log event. Callers treat failures as
    /// best-effort; see `services::activity_log`.
    pub async fn append_activity_event(&self, event: &ActivityEvent) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ACTIVITY_LOG)
            .document_id(&event.id)
            .object(event)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Helper Methods ────────────────────────────────────────────

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }
}
