//! 回数上限付きリトライ
//!
//! 自動リトライは上限回数で打ち切り、最後の失敗を 1 度だけ呼び出し元へ返す。

use crate::error::Error;

/// 自動読み込み系（トークン・カタログ取得など）の既定試行回数
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// `op` を最大 `max_attempts` 回試す
///
/// 失敗のたびに `on_failure(attempt, &err)` を呼ぶ（attempt は 1 始まり）。
/// `max_attempts` が 0 でも 1 回は試す。
pub fn with_retry<T>(
    max_attempts: u32,
    mut op: impl FnMut() -> Result<T, Error>,
    mut on_failure: impl FnMut(u32, &Error),
) -> Result<T, Error> {
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op() {
            Ok(v) => return Ok(v),
            Err(e) => {
                on_failure(attempt, &e);
                if attempt >= max_attempts {
                    return Err(e);
                }
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_succeeds_on_second_attempt() {
        let mut calls = 0;
        let mut failures = vec![];
        let result = with_retry(
            DEFAULT_MAX_ATTEMPTS,
            || {
                calls += 1;
                if calls == 1 {
                    Err(Error::http("flaky"))
                } else {
                    Ok("models")
                }
            },
            |n, _| failures.push(n),
        );
        assert_eq!(result.unwrap(), "models");
        assert_eq!(calls, 2);
        assert_eq!(failures, vec![1]);
    }

    #[test]
    fn test_stops_after_budget_and_returns_last_error() {
        let mut calls = 0;
        let result: Result<(), Error> = with_retry(
            2,
            || {
                calls += 1;
                Err(Error::http(format!("down #{}", calls)))
            },
            |_, _| {},
        );
        assert_eq!(calls, 2);
        assert_eq!(result.unwrap_err().to_string(), "down #2");
    }

    #[test]
    fn test_zero_budget_still_tries_once() {
        let mut calls = 0;
        let _ = with_retry(0, || -> Result<(), Error> {
            calls += 1;
            Err(Error::system("x"))
        }, |_, _| {});
        assert_eq!(calls, 1);
    }
}
