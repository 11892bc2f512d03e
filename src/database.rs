use sqlx::{PgPool, Row};
use anyhow::{Result, Context};

pub const REQUIRED_TABLES: [&str; 3] = ["messages", "tasks", "users"];

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        log::info!("🔗 Connecting to database...");

        let pool = PgPool::connect(database_url)
            .await
            .context("Failed to connect to the database")?;

        log::info!("✅ Database connection established");

        Ok(Database { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let row = sqlx::query("SELECT 1 as health_check")
            .fetch_one(&self.pool)
            .await
            .context("Failed to execute health check query")?;

        let result: i32 = row.get("health_check");

        if result == 1 {
            Ok(())
        } else {
            Err(anyhow::anyhow!("Database health check failed"))
        }
    }

    pub async fn check_tables(&self) -> Result<()> {
        log::info!("📋 Checking database tables...");

        let tables = sqlx::query(
            r#"
            SELECT table_name
            FROM information_schema.tables
            WHERE table_schema = 'public'
            AND table_name = ANY($1)
            ORDER BY table_name
            "#
        )
        .bind(REQUIRED_TABLES.iter().map(|t| t.to_string()).collect::<Vec<_>>())
        .fetch_all(&self.pool)
        .await
        .context("Failed to check database tables")?;

        let found_tables: Vec<String> = tables
            .iter()
            .map(|row| row.get::<String, _>("table_name"))
            .collect();

        log::info!("📊 Found tables: {:?}", found_tables);

        if found_tables.len() == REQUIRED_TABLES.len() {
            log::info!("✅ All required tables exist");
        } else {
            log::warn!("⚠️  Some tables may be missing. Expected: {:?}", REQUIRED_TABLES);
            log::warn!("   Run db/schema.sql against the database if tables are missing");
        }

        Ok(())
    }

    pub async fn get_stats(&self) -> Result<DatabaseStats> {
        let stats = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) as user_count,
                (SELECT COUNT(*) FROM tasks) as task_count,
                (SELECT COUNT(*) FROM tasks WHERE status = 'pending') as pending_count,
                (SELECT COUNT(*) FROM messages) as message_count
            "#
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to get database statistics")?;

        Ok(DatabaseStats {
            users: stats.get::<i64, _>("user_count"),
            tasks: stats.get::<i64, _>("task_count"),
            pending_tasks: stats.get::<i64, _>("pending_count"),
            messages: stats.get::<i64, _>("message_count"),
        })
    }
}

#[derive(Debug, Default)]
pub struct DatabaseStats {
    pub users: i64,
    pub tasks: i64,
    pub pending_tasks: i64,
    pub messages: i64,
}

impl DatabaseStats {
    pub fn log_stats(&self) {
        log::info!("📈 Database Statistics:");
        log::info!("   👥 Users: {}", self.users);
        log::info!("   📋 Tasks: {} ({} pending)", self.tasks, self.pending_tasks);
        log::info!("   🔔 Messages: {}", self.messages);
    }
}
