//! ポート（アプリが外界に触れるための trait）

pub mod outbound;
