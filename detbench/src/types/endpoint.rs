//! エンドポイント型定義

use std::str::FromStr;

/// エンドポイント識別子（名前 + リージョン）
///
/// ラン中は不変。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointIdentity {
    /// エンドポイント名
    pub name: String,
    /// リージョン
    pub region: String,
}

impl EndpointIdentity {
    /// 新しい識別子を作成
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
        }
    }
}

impl std::fmt::Display for EndpointIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// サービング層が報告するエンドポイントの状態
///
/// `InService` のみが「提供中」を意味する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointStatus {
    /// 作成中
    Creating,
    /// 更新中
    Updating,
    /// システム更新中
    SystemUpdating,
    /// ロールバック中
    RollingBack,
    /// 提供中
    InService,
    /// 停止中
    OutOfService,
    /// 削除中
    Deleting,
    /// 失敗
    Failed,
    /// 未知の状態（受信した文字列をそのまま保持）
    Other(String),
}

impl EndpointStatus {
    /// EndpointStatusを文字列に変換
    pub fn as_str(&self) -> &str {
        match self {
            Self::Creating => "Creating",
            Self::Updating => "Updating",
            Self::SystemUpdating => "SystemUpdating",
            Self::RollingBack => "RollingBack",
            Self::InService => "InService",
            Self::OutOfService => "OutOfService",
            Self::Deleting => "Deleting",
            Self::Failed => "Failed",
            Self::Other(raw) => raw.as_str(),
        }
    }

    /// 推論リクエストを受け付けられる状態か
    pub fn is_serving(&self) -> bool {
        matches!(self, Self::InService)
    }
}

impl FromStr for EndpointStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Creating" => Self::Creating,
            "Updating" => Self::Updating,
            "SystemUpdating" => Self::SystemUpdating,
            "RollingBack" => Self::RollingBack,
            "InService" => Self::InService,
            "OutOfService" => Self::OutOfService,
            "Deleting" => Self::Deleting,
            "Failed" => Self::Failed,
            other => Self::Other(other.to_string()),
        })
    }
}

impl std::fmt::Display for EndpointStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
