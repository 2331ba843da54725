mod common;
mod withdrawals;
