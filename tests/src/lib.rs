#![cfg(test)]

mod probe;
mod util;
