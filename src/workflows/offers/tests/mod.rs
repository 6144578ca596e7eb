mod common;
mod export;
mod matching;
