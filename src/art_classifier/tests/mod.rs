mod main_test;
