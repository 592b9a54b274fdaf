//! UseCase: 接続時認証（Auth Handshake Guard）
//!
//! WebSocket へのアップグレード前に呼ばれ、ベアラートークンを検証します。
//! 失敗した接続はセッションが作成されず、レジストリにも登録されません。

use std::sync::Arc;

use crate::domain::{TokenVerifier, VerifiedToken};

use super::error::HandshakeError;

/// 接続時認証のユースケース
pub struct AuthenticateSessionUseCase {
    verifier: Arc<dyn TokenVerifier>,
}

impl AuthenticateSessionUseCase {
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { verifier }
    }

    /// トークンを検証し、認証済みの ID を返す
    ///
    /// # Arguments
    ///
    /// * `token` - ハンドシェイクで提示されたトークン（未提示なら `None`）
    ///
    /// # Returns
    ///
    /// * `Ok(VerifiedToken)` - 認証成功
    /// * `Err(HandshakeError)` - トークン未提示、署名不正、期限切れ
    pub fn execute(&self, token: Option<&str>) -> Result<VerifiedToken, HandshakeError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(HandshakeError::MissingToken)?;

        Ok(self.verifier.verify(token)?)
    }
}
