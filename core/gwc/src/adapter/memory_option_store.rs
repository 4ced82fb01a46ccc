//! テスト用: メモリ上の OptionStore 実装（書き込み回数の記録と失敗の注入ができる）


#[cfg(test)]
pub use memory::MemoryOptionStore;
