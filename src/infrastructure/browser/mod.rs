pub mod fantoccini_page_driver;
pub mod webdriver_process;
