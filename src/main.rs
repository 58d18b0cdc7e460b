// 防止在 Windows 发布版本中显示额外的控制台窗口，不要删除！
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! # GrowLog — 应用入口
//!
//! 本文件仅负责启动；插件/命令注册与初始化见 `lib.rs` 的 `run()`。

fn main() {
    growlog_lib::run();
}
