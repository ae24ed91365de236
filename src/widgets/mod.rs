//! UI Widgets - modular, reusable UI components

pub mod viewfinder;
