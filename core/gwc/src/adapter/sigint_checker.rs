//! Ctrl+C（SIGINT）で割り込みフラグを立てる InterruptChecker 実装
//!
//! 1 回目の Ctrl+C はフラグを立てるだけで、受信中のストリームを打ち切らせる。
//! フラグが立ったままもう一度押されたら 130 で即終了する（blocking 読み取り中でも抜けられるように）。

use crate::ports::outbound::InterruptChecker;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// SIGINT で終了する場合の終了コード（128 + 2）
const SIGINT_EXIT_CODE: i32 = 130;

pub struct SigintChecker {
    flag: Arc<AtomicBool>,
}

impl SigintChecker {
    /// ハンドラを登録する。プロセスにつき 1 回だけ成功する（ctrlc の仕様）
    pub fn new() -> Result<Self, ctrlc::Error> {
        let flag = Arc::new(AtomicBool::new(false));
        let flag_clone = Arc::clone(&flag);
        ctrlc::set_handler(move || {
            if flag_clone.swap(true, Ordering::SeqCst) {
                eprintln!();
                std::process::exit(SIGINT_EXIT_CODE);
            }
            eprintln!("\n(interrupt: stopping reply, press Ctrl+C again to quit)");
        })?;
        Ok(Self { flag })
    }
}

impl InterruptChecker for SigintChecker {
    fn is_interrupted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// 割り込みを検知しないスタブ（ハンドラ登録に失敗した場合やテストで使用）
pub struct NoopInterruptChecker;

impl InterruptChecker for NoopInterruptChecker {
    fn is_interrupted(&self) -> bool {
        false
    }
}
