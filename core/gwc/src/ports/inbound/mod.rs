//! Inbound ポート: main から usecase を呼ぶ入口

use crate::domain::GwcCommand;
use common::error::Error;

/// 解析済みコマンドを実行し、終了コードを返す
pub trait UseCaseRunner {
    fn run(&self, cmd: GwcCommand) -> Result<i32, Error>;
}
