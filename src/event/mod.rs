/// 抓取基金淨值並更新序列
pub mod fund_value;
