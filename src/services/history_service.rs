use crate::error::{Error, Result};
use crate::models::{QuestionResult, QuizAttempt, QuizHistoryEntry, QuizHistoryItem};
use crate::services::grading_service::GradingService;
use crate::utils::time::to_millis;
use sqlx::{Row, SqlitePool};

#[derive(Clone)]
pub struct HistoryService {
    pool: SqlitePool,
}

impl HistoryService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert_attempt(&self, attempt: &QuizAttempt) -> Result<i64> {
        let results = GradingService::grade(&attempt.questions, &attempt.user_answers).results;
        let questions_json = serde_json::to_string(&results)?;

        let row = sqlx::query(
            r#"
            INSERT INTO quiz_history (timestamp, topics, questions_json, score, total_questions, user_id)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(to_millis(attempt.timestamp))
        .bind(attempt.topics_label.as_str())
        .bind(questions_json)
        .bind(attempt.score)
        .bind(attempt.total)
        .bind(attempt.user_id.as_str())
        .fetch_one(&self.pool)
        .await?;
        let id: i64 = row.try_get("id")?;

        tracing::info!(id, user_id = %attempt.user_id, score = attempt.score, total = attempt.total, "quiz attempt stored");
        Ok(id)
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<QuizHistoryEntry>> {
        let entries = sqlx::query_as::<_, QuizHistoryEntry>(
            r#"
            SELECT id, timestamp, topics, score, total_questions, user_id
            FROM quiz_history
            WHERE user_id = ?
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    /// One attempt with its per-question detail. An id owned by another user
    /// reads as missing.
    pub async fn get_by_id(&self, id: i64, user_id: &str) -> Result<QuizHistoryItem> {
        let row = sqlx::query(
            r#"
            SELECT id, timestamp, topics, questions_json, score, total_questions, user_id
            FROM quiz_history
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Quiz history entry {} not found", id)))?;

        let questions_json: String = row.try_get("questions_json")?;
        let questions: Vec<QuestionResult> = match serde_json::from_str(&questions_json) {
            Ok(questions) => questions,
            Err(e) => {
                tracing::warn!(id, error = %e, "stored quiz questions could not be decoded");
                Vec::new()
            }
        };

        Ok(QuizHistoryItem {
            id: row.try_get("id")?,
            timestamp: row.try_get("timestamp")?,
            topics: row.try_get("topics")?,
            score: row.try_get("score")?,
            total_questions: row.try_get("total_questions")?,
            user_id: row.try_get("user_id")?,
            questions,
        })
    }

    pub async fn delete_by_id(&self, id: i64, user_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM quiz_history WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Quiz history entry {} not found", id)));
        }
        Ok(())
    }

    pub async fn delete_for_user(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM quiz_history WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        tracing::info!(user_id, deleted = result.rows_affected(), "quiz history cleared");
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::pool::create_memory_pool;
    use crate::models::QuizQuestion;
    use chrono::{Duration, Utc};

    async fn service() -> HistoryService {
        let pool = create_memory_pool().await.expect("memory pool");
        HistoryService::new(pool)
    }

    fn attempt(user_id: &str, minutes_ago: i64, answers: Vec<i32>) -> QuizAttempt {
        let questions = vec![
            QuizQuestion {
                question: "What is mitosis?".into(),
                options: vec!["Cell division".into(), "A".into(), "B".into(), "C".into()],
                correct_answer_index: 0,
            },
            QuizQuestion {
                question: "What is ATP?".into(),
                options: vec!["X".into(), "Y".into(), "Energy".into(), "Z".into()],
                correct_answer_index: 2,
            },
        ];
        let graded = GradingService::grade(&questions, &answers);
        let user_answers = GradingService::normalize_answers(&questions, &answers);
        QuizAttempt {
            topics_label: "Biology".into(),
            questions,
            user_answers,
            score: graded.score,
            total: graded.total,
            timestamp: Utc::now() - Duration::minutes(minutes_ago),
            user_id: user_id.into(),
        }
    }

    #[tokio::test]
    async fn stores_and_reads_back_attempt_details() {
        let history = service().await;
        let id = history
            .insert_attempt(&attempt("alice", 0, vec![0, 1]))
            .await
            .unwrap();

        let item = history.get_by_id(id, "alice").await.unwrap();
        assert_eq!(item.topics, "Biology");
        assert_eq!(item.score, 1);
        assert_eq!(item.total_questions, 2);
        assert_eq!(item.user_id.as_deref(), Some("alice"));
        assert_eq!(item.questions.len(), 2);
        assert!(item.questions[0].is_correct);
        assert!(!item.questions[1].is_correct);
        assert_eq!(item.questions[1].user_answer_index, 1);
    }

    #[tokio::test]
    async fn lists_only_the_users_entries_newest_first() {
        let history = service().await;
        let older = history.insert_attempt(&attempt("alice", 30, vec![0])).await.unwrap();
        let newer = history.insert_attempt(&attempt("alice", 1, vec![0, 2])).await.unwrap();
        history.insert_attempt(&attempt("bob", 0, vec![])).await.unwrap();

        let entries = history.list_for_user("alice").await.unwrap();
        let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![newer, older]);
        assert_eq!(entries[0].score, 2);
    }

    #[tokio::test]
    async fn deletes_single_entries_and_whole_user_history() {
        let history = service().await;
        let first = history.insert_attempt(&attempt("carol", 2, vec![])).await.unwrap();
        history.insert_attempt(&attempt("carol", 1, vec![])).await.unwrap();
        history.insert_attempt(&attempt("dave", 1, vec![])).await.unwrap();

        history.delete_by_id(first, "carol").await.unwrap();
        assert!(matches!(history.get_by_id(first, "carol").await, Err(Error::NotFound(_))));
        assert!(matches!(history.delete_by_id(first, "carol").await, Err(Error::NotFound(_))));

        assert_eq!(history.delete_for_user("carol").await.unwrap(), 1);
        assert!(history.list_for_user("carol").await.unwrap().is_empty());
        assert_eq!(history.list_for_user("dave").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn entries_are_invisible_to_other_users() {
        let history = service().await;
        let id = history.insert_attempt(&attempt("alice", 0, vec![0])).await.unwrap();

        assert!(matches!(history.get_by_id(id, "mallory").await, Err(Error::NotFound(_))));
        assert!(matches!(history.delete_by_id(id, "mallory").await, Err(Error::NotFound(_))));
        assert!(matches!(history.get_by_id(id, "").await, Err(Error::NotFound(_))));

        assert_eq!(history.get_by_id(id, "alice").await.unwrap().id, id);
    }
}
