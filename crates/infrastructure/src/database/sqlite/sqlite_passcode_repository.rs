use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use rozgar_domain::entities::PasscodeToken;
use rozgar_domain::repositories::PasscodeRepository;
use rozgar_errors::RozgarResult;

use crate::error_handling::{OperationContext, RepositoryErrorHelpers, RepositoryOperation};

pub struct SqlitePasscodeRepository {
    pool: SqlitePool,
}

impl SqlitePasscodeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_token(row: &sqlx::sqlite::SqliteRow) -> RozgarResult<PasscodeToken> {
        Ok(PasscodeToken {
            id: row.try_get("id")?,
            contact: row.try_get("contact")?,
            code: row.try_get("code")?,
            issued_at: row.try_get("issued_at")?,
            used: row.try_get("used")?,
        })
    }
}

#[async_trait]
impl PasscodeRepository for SqlitePasscodeRepository {
    async fn create(&self, token: &PasscodeToken) -> RozgarResult<PasscodeToken> {
        let context = OperationContext::new(RepositoryOperation::Create, "验证码令牌")
            .with_id(token.id.clone());
        sqlx::query(
            "INSERT INTO passcode_tokens (id, contact, code, issued_at, used) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&token.id)
        .bind(&token.contact)
        .bind(&token.code)
        .bind(token.issued_at)
        .bind(token.used)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;
        Ok(token.clone())
    }

    async fn find_latest_unused(
        &self,
        contact: &str,
        code: &str,
    ) -> RozgarResult<Option<PasscodeToken>> {
        let context = OperationContext::new(RepositoryOperation::Read, "验证码令牌");
        // 同秒签发用rowid决出最近一条
        let row = sqlx::query(
            r#"
            SELECT * FROM passcode_tokens
            WHERE contact = ?1 AND code = ?2 AND used = 0
            ORDER BY issued_at DESC, rowid DESC
            LIMIT 1
            "#,
        )
        .bind(contact)
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;
        row.map(|r| Self::row_to_token(&r)).transpose()
    }

    async fn consume(&self, id: &str) -> RozgarResult<bool> {
        let context = OperationContext::new(RepositoryOperation::Update, "验证码令牌")
            .with_id(id.to_string());
        // 比较交换: 并发校验只有一方改写成功
        let result = sqlx::query("UPDATE passcode_tokens SET used = 1 WHERE id = ?1 AND used = 0")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;
        let consumed = result.rows_affected() == 1;
        if consumed {
            debug!(token_id = %id, "验证码令牌已消费");
        }
        Ok(consumed)
    }
}
