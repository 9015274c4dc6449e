pub mod execution_service;
pub mod trading_loop;

#[cfg(test)]
mod test_support;
