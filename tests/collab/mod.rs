mod meeting_tests;
mod presence_tests;
