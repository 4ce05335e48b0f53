//! # Reply Service ライブラリ
//!
//! ユースケース・ハンドラ・ルーター構築を公開する。
//! 統合テストからルーターを直接組み立てられるようにする。

pub mod app_builder;
pub mod config;
pub mod error;
pub mod handler;
pub mod usecase;
