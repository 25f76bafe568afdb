use std::fmt;

use zeroize::Zeroize;

/// An opaque bearer credential (access or refresh token).
///
/// 不透明的凭证字符串：
/// - 不解析内容
/// - Debug / Display 不输出真实内容
/// - Drop 时清零内存
///
/// Unlike a plain secret, a token is `Clone` because session snapshots are
/// published to observers; every copy is zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken {
    inner: String,
}

impl BearerToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: value.into(),
        }
    }

    /// Borrow the raw token, e.g. to build an `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.inner
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

impl fmt::Display for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for BearerToken {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for BearerToken {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Drop for BearerToken {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}
