pub mod news;
pub mod news_images;
pub mod page_blocks;
pub mod pages;
