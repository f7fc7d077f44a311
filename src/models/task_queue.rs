//! Per-task rotation of workers.
//!
//! Positions within a task are kept sequential from 0. The worker at
//! position 0 is the next one suggested for that task.

use serde::Serialize;
use sqlx::{FromRow, SqliteConnection};

use super::assignment::TaskType;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct QueueEntry {
    pub worker_id: i64,
    pub worker_name: String,
    pub task_type: String,
    pub position: i64,
}

pub async fn queue_for_task(
    conn: &mut SqliteConnection,
    task_type: TaskType,
) -> Result<Vec<QueueEntry>, sqlx::Error> {
    sqlx::query_as::<_, QueueEntry>(
        "SELECT q.worker_id, w.name AS worker_name, q.task_type, q.position
         FROM task_queues q
         JOIN workers w ON q.worker_id = w.id
         WHERE q.task_type = ?
         ORDER BY q.position, q.worker_id",
    )
    .bind(task_type.as_str())
    .fetch_all(&mut *conn)
    .await
}

pub async fn next_worker(
    conn: &mut SqliteConnection,
    task_type: TaskType,
) -> Result<Option<QueueEntry>, sqlx::Error> {
    Ok(queue_for_task(conn, task_type).await?.into_iter().next())
}

/// Puts a worker last, after an assignment. A worker missing from the queue is appended.
pub async fn move_to_end(
    conn: &mut SqliteConnection,
    worker_id: i64,
    task_type: TaskType,
) -> Result<(), sqlx::Error> {
    let mut order = queued_worker_ids(conn, task_type).await?;
    order.retain(|id| *id != worker_id);
    order.push(worker_id);
    write_order(conn, task_type, &order).await
}

/// Puts a worker first, after one of its assignments is removed.
pub async fn move_to_front(
    conn: &mut SqliteConnection,
    worker_id: i64,
    task_type: TaskType,
) -> Result<(), sqlx::Error> {
    let mut order = queued_worker_ids(conn, task_type).await?;
    order.retain(|id| *id != worker_id);
    order.insert(0, worker_id);
    write_order(conn, task_type, &order).await
}

/// Appends the worker to every task queue it is not in yet. Returns how many entries were added.
pub async fn initialize_for_worker(
    conn: &mut SqliteConnection,
    worker_id: i64,
) -> Result<u64, sqlx::Error> {
    let mut created = 0;
    for task_type in TaskType::ALL {
        let result = sqlx::query(
            "INSERT INTO task_queues (worker_id, task_type, position)
             SELECT ?, ?, COALESCE(MAX(position), -1) + 1 FROM task_queues WHERE task_type = ?
             ON CONFLICT (worker_id, task_type) DO NOTHING",
        )
        .bind(worker_id)
        .bind(task_type.as_str())
        .bind(task_type.as_str())
        .execute(&mut *conn)
        .await?;
        created += result.rows_affected();
    }
    Ok(created)
}

async fn queued_worker_ids(
    conn: &mut SqliteConnection,
    task_type: TaskType,
) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT worker_id FROM task_queues WHERE task_type = ? ORDER BY position, worker_id",
    )
    .bind(task_type.as_str())
    .fetch_all(&mut *conn)
    .await
}

async fn write_order(
    conn: &mut SqliteConnection,
    task_type: TaskType,
    order: &[i64],
) -> Result<(), sqlx::Error> {
    for (position, worker_id) in order.iter().enumerate() {
        sqlx::query(
            "INSERT INTO task_queues (worker_id, task_type, position) VALUES (?, ?, ?)
             ON CONFLICT (worker_id, task_type) DO UPDATE SET position = excluded.position",
        )
        .bind(worker_id)
        .bind(task_type.as_str())
        .bind(position as i64)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use sqlx::SqlitePool;

    use super::*;
    use crate::db::memory_pool;

    // Three workers queued for kitchen in id order
    async fn kitchen_queue() -> SqlitePool {
        let pool = memory_pool().await;
        for (id, name) in [(1, "Worker One"), (2, "Worker Two"), (3, "Worker Three")] {
            sqlx::query(
                "INSERT INTO workers (id, name, created_at, updated_at)
                 VALUES (?, ?, '2024-01-01 00:00:00', '2024-01-01 00:00:00')",
            )
            .bind(id)
            .bind(name)
            .execute(&pool)
            .await
            .unwrap();
            sqlx::query("INSERT INTO task_queues (worker_id, task_type, position) VALUES (?, 'kitchen', ?)")
                .bind(id)
                .bind(id - 1)
                .execute(&pool)
                .await
                .unwrap();
        }
        pool
    }

    async fn order(pool: &SqlitePool) -> Vec<(String, i64)> {
        let mut conn = pool.acquire().await.unwrap();
        queue_for_task(&mut conn, TaskType::Kitchen)
            .await
            .unwrap()
            .into_iter()
            .map(|e| (e.worker_name, e.position))
            .collect()
    }

    async fn next(pool: &SqlitePool) -> Option<i64> {
        let mut conn = pool.acquire().await.unwrap();
        next_worker(&mut conn, TaskType::Kitchen)
            .await
            .unwrap()
            .map(|e| e.worker_id)
    }

    #[tokio::test]
    async fn next_worker_is_at_the_head() {
        let pool = kitchen_queue().await;
        assert_eq!(next(&pool).await, Some(1));

        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(next_worker(&mut conn, TaskType::Kitchen).await.unwrap().map(|e| e.worker_name), Some("Worker One".into()));
        assert_eq!(next_worker(&mut conn, TaskType::PatrolA).await.unwrap(), None);
    }

    #[tokio::test]
    async fn move_to_end_from_middle_keeps_positions_sequential() {
        let pool = kitchen_queue().await;
        {
            let mut conn = pool.acquire().await.unwrap();
            move_to_end(&mut conn, 2, TaskType::Kitchen).await.unwrap();
        }
        assert_eq!(
            order(&pool).await,
            vec![
                ("Worker One".to_string(), 0),
                ("Worker Three".to_string(), 1),
                ("Worker Two".to_string(), 2),
            ]
        );
    }

    #[tokio::test]
    async fn move_to_front_puts_worker_first() {
        let pool = kitchen_queue().await;
        {
            let mut conn = pool.acquire().await.unwrap();
            move_to_front(&mut conn, 3, TaskType::Kitchen).await.unwrap();
        }
        assert_eq!(
            order(&pool).await,
            vec![
                ("Worker Three".to_string(), 0),
                ("Worker One".to_string(), 1),
                ("Worker Two".to_string(), 2),
            ]
        );
    }

    #[tokio::test]
    async fn full_rotation_cycles_back_to_the_first_worker() {
        let pool = kitchen_queue().await;
        for expected in [1, 2, 3, 1] {
            let head = next(&pool).await.unwrap();
            assert_eq!(head, expected);
            let mut conn = pool.acquire().await.unwrap();
            move_to_end(&mut conn, head, TaskType::Kitchen).await.unwrap();
        }
    }

    #[tokio::test]
    async fn initialize_adds_missing_entries_once() {
        let pool = kitchen_queue().await;
        let mut conn = pool.acquire().await.unwrap();

        // Worker 1 is already in the kitchen queue
        assert_eq!(initialize_for_worker(&mut conn, 1).await.unwrap(), 3);
        assert_eq!(initialize_for_worker(&mut conn, 1).await.unwrap(), 0);

        let patrol = queue_for_task(&mut conn, TaskType::PatrolA).await.unwrap();
        assert_eq!(patrol.len(), 1);
        assert_eq!(patrol[0].position, 0);
    }
}
