mod performance_test;
