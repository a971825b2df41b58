//! Book Command Handlers

use std::sync::Arc;

use crate::application::commands::{AddBook, DeleteBook};
use crate::application::error::ApplicationError;
use crate::application::ports::{BookRecord, BookRepositoryPort};
use crate::domain::book::NewBook;

// ============================================================================
// AddBook
// ============================================================================

/// AddBook Handler
pub struct AddBookHandler {
    book_repo: Arc<dyn BookRepositoryPort>,
}

impl AddBookHandler {
    pub fn new(book_repo: Arc<dyn BookRepositoryPort>) -> Self {
        Self { book_repo }
    }

    pub async fn handle(&self, command: AddBook) -> Result<BookRecord, ApplicationError> {
        let book = NewBook::new(
            command.title,
            command.author,
            command.isbn,
            command.page_count,
        )?;

        let record = self.book_repo.save(&book).await?;

        tracing::info!(
            book_id = record.id,
            title = %record.title,
            author = %record.author,
            "Book added"
        );

        Ok(record)
    }
}

// ============================================================================
// DeleteBook
// ============================================================================

/// DeleteBook Handler
pub struct DeleteBookHandler {
    book_repo: Arc<dyn BookRepositoryPort>,
}

impl DeleteBookHandler {
    pub fn new(book_repo: Arc<dyn BookRepositoryPort>) -> Self {
        Self { book_repo }
    }

    pub async fn handle(&self, command: DeleteBook) -> Result<BookRecord, ApplicationError> {
        let book_id = command.book_id;

        let book = self
            .book_repo
            .find_by_id(book_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Book", book_id))?;

        // 并发删除时记录可能已不存在
        if !self.book_repo.delete(book_id).await? {
            return Err(ApplicationError::not_found("Book", book_id));
        }

        tracing::info!(book_id = book_id, title = %book.title, "Book deleted");

        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteBookRepository,
    };

    async fn repo() -> Arc<dyn BookRepositoryPort> {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        Arc::new(SqliteBookRepository::new(pool))
    }

    fn dune() -> AddBook {
        AddBook {
            title: Some("Dune".into()),
            author: Some("Herbert".into()),
            isbn: Some("0441013597".into()),
            page_count: Some(412),
        }
    }

    #[tokio::test]
    async fn test_add_book_assigns_id() {
        let repo = repo().await;
        let handler = AddBookHandler::new(repo.clone());

        let record = handler.handle(dune()).await.unwrap();
        assert!(record.id > 0);
        assert_eq!(record.title, "Dune");

        let found = repo.find_by_id(record.id).await.unwrap();
        assert_eq!(found, Some(record));
    }

    #[tokio::test]
    async fn test_add_book_rejects_missing_fields() {
        let handler = AddBookHandler::new(repo().await);

        let err = handler.handle(AddBook::default()).await.unwrap_err();
        match err {
            ApplicationError::InvalidFields { errors, .. } => assert_eq!(errors.len(), 4),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_unknown_book_is_not_found() {
        let handler = DeleteBookHandler::new(repo().await);

        let err = handler.handle(DeleteBook { book_id: 9999 }).await.unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_existing_book() {
        let repo = repo().await;
        let record = AddBookHandler::new(repo.clone()).handle(dune()).await.unwrap();

        let deleted = DeleteBookHandler::new(repo.clone())
            .handle(DeleteBook { book_id: record.id })
            .await
            .unwrap();
        assert_eq!(deleted.id, record.id);
        assert!(repo.find_by_id(record.id).await.unwrap().is_none());
    }
}
