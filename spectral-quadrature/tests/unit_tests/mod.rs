mod lagrange;
