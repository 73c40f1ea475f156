mod chat_socket_test;
