mod stream_relay_test;
